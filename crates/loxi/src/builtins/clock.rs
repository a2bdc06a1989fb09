//! `clock()` — milliseconds since the interpreter started.

use std::time::Instant;

use crate::value::Value;

pub fn call(start: Instant) -> Value {
    Value::Number(start.elapsed().as_secs_f64() * 1000.0)
}
