use std::{cell::RefCell, fmt::Display, str::FromStr};

use tracing::warn;

use crate::runtime::RunConfig;

#[derive(Clone, Copy)]
struct Env {
    memory_capacity: Option<usize>,
    max_steps: Option<u64>,
}

thread_local! {
    /// Must only be mutated within `set_env`
    static ENV: RefCell<Option<Env>> = const { RefCell::new(None) };
}

pub const MEMORY_VAR: &str = "ARMLET_MEMORY";
pub const MAX_STEPS_VAR: &str = "ARMLET_MAX_STEPS";

/// Read settings from the environment. Values that fail to parse are ignored with a warning.
pub fn init() {
    let value = Env {
        memory_capacity: var_parse(MEMORY_VAR),
        max_steps: var_parse(MAX_STEPS_VAR),
    };
    set_env(value);
}

pub fn memory_capacity() -> Option<usize> {
    with_env(|env| env.memory_capacity)
}

pub fn max_steps() -> Option<u64> {
    with_env(|env| env.max_steps)
}

/// Defaults, overridden by whatever the environment sets.
pub fn run_config() -> RunConfig {
    let default = RunConfig::default();
    RunConfig {
        memory_capacity: memory_capacity().unwrap_or(default.memory_capacity),
        max_steps: max_steps().or(default.max_steps),
    }
}

fn set_env(value: Env) {
    ENV.with(|env| {
        let mut env = env.borrow_mut();
        assert!(
            env.is_none(),
            "tried to initialize environment state multiple times"
        );
        *env = Some(value);
    });
}

fn with_env<F, R>(callback: F) -> R
where
    F: Fn(&Env) -> R,
{
    ENV.with(|env| {
        let env = env.borrow();
        let env = env.unwrap_or_else(|| {
            panic!("tried to access environment state before initialization");
        });
        callback(&env)
    })
}

fn var_parse<T>(name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    parse_value(name, std::env::var(name).ok().as_deref())
}

fn parse_value<T>(name: &str, value: Option<&str>) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(var = name, value, "ignoring invalid environment value: {err}");
            None
        }
    }
}
