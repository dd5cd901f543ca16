// Four-phase full-step driver over four remote coil outputs.

use crate::ClientResult;
use crate::gpio::{Gpo, State};

/// Rotation direction of the shaft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinDirection {
    Cw,
    Ccw,
}

const COILS: usize = 4;
const PHASE_COUNT: usize = 4;

/// Full-step drive table for the coil outputs in (LH, LL, RH, RL) order.
const PHASES: [[State; COILS]; PHASE_COUNT] = [
    [State::High, State::Low, State::High, State::Low],
    [State::Low, State::High, State::High, State::Low],
    [State::Low, State::High, State::Low, State::High],
    [State::High, State::Low, State::Low, State::High],
];

/// Bipolar step motor behind four output pins, one per coil shoulder
/// (left-high, left-low, right-high, right-low).
///
/// The motor borrows its outputs and drives them through the four-entry
/// phase table; construction applies phase 0.
pub struct StepMotor<'a> {
    coils: [&'a dyn Gpo; COILS],
    phase: usize,
}

impl<'a> StepMotor<'a> {
    pub fn new(
        lh: &'a dyn Gpo,
        ll: &'a dyn Gpo,
        rh: &'a dyn Gpo,
        rl: &'a dyn Gpo,
    ) -> ClientResult<Self> {
        let motor = Self {
            coils: [lh, ll, rh, rl],
            phase: 0,
        };
        motor.apply(motor.phase)?;
        Ok(motor)
    }

    /// Index of the phase currently driven onto the coils.
    pub fn phase(&self) -> usize {
        self.phase
    }

    /// Rotates the drive table one entry and writes every coil.
    pub fn step(&mut self, dir: SpinDirection) -> ClientResult<()> {
        let next = match dir {
            SpinDirection::Cw => (self.phase + 1) % PHASE_COUNT,
            SpinDirection::Ccw => (self.phase + PHASE_COUNT - 1) % PHASE_COUNT,
        };
        self.apply(next)?;
        self.phase = next;
        Ok(())
    }

    fn apply(&self, phase: usize) -> ClientResult<()> {
        for (coil, state) in self.coils.iter().zip(PHASES[phase]) {
            coil.set_state(state)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use crate::gpio::Gpi;

    use super::*;

    struct FakeCoil {
        level: Cell<State>,
        writes: Cell<usize>,
    }

    impl FakeCoil {
        fn new() -> Self {
            Self {
                level: Cell::new(State::Low),
                writes: Cell::new(0),
            }
        }
    }

    impl Gpi for FakeCoil {
        fn state(&self) -> ClientResult<State> {
            Ok(self.level.get())
        }
    }

    impl Gpo for FakeCoil {
        fn set_state(&self, state: State) -> ClientResult<()> {
            self.level.set(state);
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }
    }

    fn levels(coils: &[FakeCoil; 4]) -> [State; 4] {
        [
            coils[0].level.get(),
            coils[1].level.get(),
            coils[2].level.get(),
            coils[3].level.get(),
        ]
    }

    fn motor<'a>(coils: &'a [FakeCoil; 4]) -> StepMotor<'a> {
        StepMotor::new(&coils[0], &coils[1], &coils[2], &coils[3]).unwrap()
    }

    #[test]
    fn construction_applies_phase_zero() {
        let coils = [FakeCoil::new(), FakeCoil::new(), FakeCoil::new(), FakeCoil::new()];
        let m = motor(&coils);
        assert_eq!(0, m.phase());
        assert_eq!(PHASES[0], levels(&coils));
        assert!(coils.iter().all(|coil| coil.writes.get() == 1));
    }

    #[test]
    fn cw_walks_the_table_and_wraps() {
        let coils = [FakeCoil::new(), FakeCoil::new(), FakeCoil::new(), FakeCoil::new()];
        let mut m = motor(&coils);
        for expected in [1usize, 2, 3, 0, 1] {
            m.step(SpinDirection::Cw).unwrap();
            assert_eq!(expected, m.phase());
            assert_eq!(PHASES[expected], levels(&coils));
        }
    }

    #[test]
    fn ccw_wraps_backwards_from_phase_zero() {
        let coils = [FakeCoil::new(), FakeCoil::new(), FakeCoil::new(), FakeCoil::new()];
        let mut m = motor(&coils);
        m.step(SpinDirection::Ccw).unwrap();
        assert_eq!(3, m.phase());
        assert_eq!(PHASES[3], levels(&coils));
        m.step(SpinDirection::Ccw).unwrap();
        assert_eq!(2, m.phase());
    }

    #[test]
    fn alternating_steps_cancel_out() {
        let coils = [FakeCoil::new(), FakeCoil::new(), FakeCoil::new(), FakeCoil::new()];
        let mut m = motor(&coils);
        for _ in 0..3 {
            m.step(SpinDirection::Cw).unwrap();
            m.step(SpinDirection::Ccw).unwrap();
        }
        assert_eq!(0, m.phase());
        assert_eq!(PHASES[0], levels(&coils));
    }

    #[test]
    fn n_steps_land_on_n_mod_4() {
        let coils = [FakeCoil::new(), FakeCoil::new(), FakeCoil::new(), FakeCoil::new()];
        let mut m = motor(&coils);
        for _ in 0..10 {
            m.step(SpinDirection::Cw).unwrap();
        }
        assert_eq!(10 % 4, m.phase());
        for _ in 0..7 {
            m.step(SpinDirection::Ccw).unwrap();
        }
        assert_eq!((10 - 7_i32).rem_euclid(4) as usize, m.phase());
    }
}
