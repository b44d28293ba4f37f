//! Configuration files.
//!
//! JSON (the serde form of [`Configuration`]) is the native format. The
//! older properties layout is also read and written: one `key=value,type`
//! entry per line with `type` one of `int`, `float64` or `string`, blank
//! lines and `#` comments ignored.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::warn;
use phylevo_sim::simulation::Configuration;

use crate::FormatError;

pub const KEY_POPULATION: &str = "ga.algo.params.population.count";
pub const KEY_GENERATIONS: &str = "ga.algo.params.generations.count";
pub const KEY_STABLE: &str = "ga.algo.params.generations.stable.limit";
pub const KEY_SURVIVAL: &str = "ga.algo.params.selection.proliferation.fraction";
pub const KEY_BRANCH: &str = "ga.algo.params.mutation.branchlength";
pub const KEY_PARAMETER: &str = "ga.algo.params.mutation.nucleotide";
pub const KEY_TOPOLOGY: &str = "ga.algo.params.mutation.topology";
pub const KEY_CROSSOVER: &str = "ga.algo.params.crossover";
pub const KEY_SEQUENCE_LENGTH: &str = "ga.algo.params.sequencedata.length.max";
pub const KEY_SAMPLING: &str = "ga.output.sampling.interval";
pub const KEY_SEED: &str = "ga.algo.params.seed";

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Read a configuration file: JSON for a `.json` extension, the
/// properties layout otherwise. The result is validated.
pub fn read_config(path: impl AsRef<Path>) -> Result<Configuration, FormatError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| FormatError::io(path, e))?;
    let config = if is_json(path) {
        serde_json::from_str(&text)?
    } else {
        parse_properties(&text)?
    };
    config.validate()?;
    Ok(config)
}

/// Write a configuration file, choosing the layout from the extension as
/// [`read_config`] does.
pub fn write_config(path: impl AsRef<Path>, config: &Configuration) -> Result<(), FormatError> {
    let path = path.as_ref();
    if is_json(path) {
        write_config_json(path, config)
    } else {
        fs::write(path, to_properties(config)).map_err(|e| FormatError::io(path, e))
    }
}

/// Write a configuration as pretty-printed JSON.
pub fn write_config_json(path: impl AsRef<Path>, config: &Configuration) -> Result<(), FormatError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json).map_err(|e| FormatError::io(path, e))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Parse the properties layout into a configuration.
///
/// Every key except the seed is required. Unknown keys are ignored with a
/// warning.
pub fn parse_properties(text: &str) -> Result<Configuration, FormatError> {
    let mut values: HashMap<String, Value> = HashMap::new();

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, rest) = line
            .split_once('=')
            .ok_or_else(|| FormatError::bad_line(i + 1, "expected key=value,type"))?;
        let (value, ty) = rest
            .rsplit_once(',')
            .ok_or_else(|| FormatError::bad_line(i + 1, "expected key=value,type"))?;
        let (key, value, ty) = (key.trim(), value.trim(), ty.trim());

        let parsed = match ty {
            "int" => Value::Int(value.parse().map_err(|_| invalid(key, value, "int"))?),
            "float64" => Value::Float(value.parse().map_err(|_| invalid(key, value, "float64"))?),
            "string" => Value::Text(value.to_string()),
            other => {
                return Err(FormatError::bad_line(i + 1, format!("unknown value type '{other}'")))
            }
        };
        values.insert(key.to_string(), parsed);
    }

    let known = [
        KEY_POPULATION,
        KEY_GENERATIONS,
        KEY_STABLE,
        KEY_SURVIVAL,
        KEY_BRANCH,
        KEY_PARAMETER,
        KEY_TOPOLOGY,
        KEY_CROSSOVER,
        KEY_SEQUENCE_LENGTH,
        KEY_SAMPLING,
        KEY_SEED,
    ];
    for key in values.keys() {
        if !known.contains(&key.as_str()) {
            warn!("Ignoring unknown configuration key '{key}'");
        }
    }

    let mut config = Configuration::default();
    let exec = &mut config.execution;
    exec.population_size = count(&values, KEY_POPULATION)?;
    exec.generations = count(&values, KEY_GENERATIONS)?;
    exec.stable_generations = count(&values, KEY_STABLE)?;
    exec.max_sequence_length = count(&values, KEY_SEQUENCE_LENGTH)?;
    exec.report_every = count(&values, KEY_SAMPLING)?;
    exec.seed = match values.get(KEY_SEED) {
        None => None,
        Some(Value::Int(v)) if *v >= 0 => Some(*v as u64),
        Some(other) => return Err(invalid(KEY_SEED, &describe(other), "int")),
    };

    config.mutation.branch_rate = real(&values, KEY_BRANCH)?;
    config.mutation.parameter_rate = real(&values, KEY_PARAMETER)?;
    config.mutation.topology_rate = real(&values, KEY_TOPOLOGY)?;
    config.mutation.crossover_prob = real(&values, KEY_CROSSOVER)?;
    config.selection.survival_fraction = real(&values, KEY_SURVIVAL)?;
    Ok(config)
}

/// Render a configuration in the properties layout.
pub fn to_properties(config: &Configuration) -> String {
    let exec = &config.execution;
    let mut lines = vec![
        format!("{KEY_POPULATION}={},int", exec.population_size),
        format!("{KEY_GENERATIONS}={},int", exec.generations),
        format!("{KEY_STABLE}={},int", exec.stable_generations),
        format!("{KEY_SURVIVAL}={},float64", config.selection.survival_fraction),
        format!("{KEY_BRANCH}={},float64", config.mutation.branch_rate),
        format!("{KEY_PARAMETER}={},float64", config.mutation.parameter_rate),
        format!("{KEY_TOPOLOGY}={},float64", config.mutation.topology_rate),
        format!("{KEY_CROSSOVER}={},float64", config.mutation.crossover_prob),
        format!("{KEY_SEQUENCE_LENGTH}={},int", exec.max_sequence_length),
        format!("{KEY_SAMPLING}={},int", exec.report_every),
    ];
    if let Some(seed) = exec.seed {
        lines.push(format!("{KEY_SEED}={seed},int"));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn invalid(key: &str, value: &str, ty: &'static str) -> FormatError {
    FormatError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        ty,
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Int(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Text(v) => v.clone(),
    }
}

fn count(values: &HashMap<String, Value>, key: &'static str) -> Result<usize, FormatError> {
    match values.get(key) {
        None => Err(FormatError::MissingKey(key)),
        Some(Value::Int(v)) if *v >= 0 => Ok(*v as usize),
        Some(other) => Err(invalid(key, &describe(other), "int")),
    }
}

/// Float keys also accept integer entries.
fn real(values: &HashMap<String, Value>, key: &'static str) -> Result<f64, FormatError> {
    match values.get(key) {
        None => Err(FormatError::MissingKey(key)),
        Some(Value::Float(v)) => Ok(*v),
        Some(Value::Int(v)) => Ok(*v as f64),
        Some(other) => Err(invalid(key, &describe(other), "float64")),
    }
}
