// Canonical request field names and task tags agreed with the MCU firmware.

use serde_json::{Map, Value};

use super::{Direction, State};

pub const CTOR_ID: &str = "ctor_id";
pub const GPIO_ID: &str = "gpio_id";
pub const GPIO_DIR: &str = "gpio_dir";
pub const GPIO_STATE: &str = "gpio_state";
pub const DELAY_MS: &str = "delay_ms";
pub const TASKS: &str = "tasks";
pub const RESULT: &str = "result";
pub const WHAT: &str = "what";

/// Task tags dispatched by the MCU task engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
    CreateGpio = 0,
    DeleteGpio = 1,
    SetGpio = 2,
    GetGpio = 3,
    Delay = 4,
    Sequence = 5,
}

impl From<TaskType> for i64 {
    fn from(task: TaskType) -> Self {
        task as i64
    }
}

fn tag(task: TaskType) -> Value {
    Value::from(i64::from(task))
}

pub fn create_gpio(id: i64, dir: Direction) -> Value {
    let mut data = Map::new();
    data.insert(CTOR_ID.into(), tag(TaskType::CreateGpio));
    data.insert(GPIO_ID.into(), Value::from(id));
    data.insert(GPIO_DIR.into(), Value::from(i64::from(dir)));
    Value::Object(data)
}

pub fn delete_gpio(id: i64) -> Value {
    let mut data = Map::new();
    data.insert(CTOR_ID.into(), tag(TaskType::DeleteGpio));
    data.insert(GPIO_ID.into(), Value::from(id));
    Value::Object(data)
}

pub fn set_gpio(id: i64, state: State) -> Value {
    let mut data = Map::new();
    data.insert(CTOR_ID.into(), tag(TaskType::SetGpio));
    data.insert(GPIO_ID.into(), Value::from(id));
    data.insert(GPIO_STATE.into(), Value::from(i64::from(state)));
    Value::Object(data)
}

pub fn get_gpio(id: i64) -> Value {
    let mut data = Map::new();
    data.insert(CTOR_ID.into(), tag(TaskType::GetGpio));
    data.insert(GPIO_ID.into(), Value::from(id));
    Value::Object(data)
}

pub fn delay(delay_ms: i64) -> Value {
    let mut data = Map::new();
    data.insert(CTOR_ID.into(), tag(TaskType::Delay));
    data.insert(DELAY_MS.into(), Value::from(delay_ms));
    Value::Object(data)
}

/// A compound request whose elements are themselves request objects, run by
/// the MCU in order.
pub fn sequence(tasks: Vec<Value>) -> Value {
    let mut data = Map::new();
    data.insert(CTOR_ID.into(), tag(TaskType::Sequence));
    data.insert(TASKS.into(), Value::Array(tasks));
    Value::Object(data)
}
