use std::collections::{HashMap, VecDeque};
use std::fmt;

use crate::error::RenderError;

/// Media type of an input stream specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
}

/// One end of an edge in the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pad {
    /// A stream of a command-line input, e.g. `[0:v]`
    Stream { input: usize, kind: StreamKind },
    /// A named link between two chains, e.g. `[va]`
    Link(String),
}

impl Pad {
    pub fn video(input: usize) -> Self {
        Self::Stream { input, kind: StreamKind::Video }
    }

    pub fn audio(input: usize) -> Self {
        Self::Stream { input, kind: StreamKind::Audio }
    }

    pub fn link<S: Into<String>>(label: S) -> Self {
        Self::Link(label.into())
    }
}

impl fmt::Display for Pad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream { input, kind: StreamKind::Video } => write!(f, "[{}:v]", input),
            Self::Stream { input, kind: StreamKind::Audio } => write!(f, "[{}:a]", input),
            Self::Link(label) => write!(f, "[{}]", label),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FilterOption {
    Positional(String),
    Named(String, String),
}

/// A single processing stage, e.g. `fps=fps=30`
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    name: String,
    options: Vec<FilterOption>,
}

impl Filter {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    /// Append a `key=value` option
    pub fn opt<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.options.push(FilterOption::Named(key.into(), value.to_string()));
        self
    }

    /// Append a positional option
    pub fn arg<V: ToString>(mut self, value: V) -> Self {
        self.options.push(FilterOption::Positional(value.to_string()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a named option's raw value
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.iter().find_map(|option| match option {
            FilterOption::Named(k, v) if k == key => Some(v.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (i, option) in self.options.iter().enumerate() {
            f.write_str(if i == 0 { "=" } else { ":" })?;
            match option {
                FilterOption::Positional(value) => write!(f, "{}", escape_value(value))?,
                FilterOption::Named(key, value) => write!(f, "{}={}", key, escape_value(value))?,
            }
        }
        Ok(())
    }
}

/// Escape an option value for both ffmpeg parsing levels
///
/// The option parser splits on `:`; the graph parser splits on `[],;`.
fn escape_value(value: &str) -> String {
    let mut option_level = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | ':' | '\'') {
            option_level.push('\\');
        }
        option_level.push(c);
    }

    let mut graph_level = String::with_capacity(option_level.len());
    for c in option_level.chars() {
        if matches!(c, '\\' | '\'' | '[' | ']' | ',' | ';') {
            graph_level.push('\\');
        }
        graph_level.push(c);
    }
    graph_level
}

/// A linear run of filters with labeled input and output pads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    inputs: Vec<Pad>,
    filters: Vec<Filter>,
    outputs: Vec<String>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, pad: Pad) -> Self {
        self.inputs.push(pad);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn output<S: Into<String>>(mut self, label: S) -> Self {
        self.outputs.push(label.into());
        self
    }

    pub fn inputs(&self) -> &[Pad] {
        &self.inputs
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    fn linked_inputs(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().filter_map(|pad| match pad {
            Pad::Link(label) => Some(label.as_str()),
            Pad::Stream { .. } => None,
        })
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pad in &self.inputs {
            write!(f, "{}", pad)?;
        }
        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", filter)?;
        }
        for label in &self.outputs {
            write!(f, "[{}]", label)?;
        }
        Ok(())
    }
}

/// A directed acyclic filter graph plus the labels handed to `-map`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGraph {
    chains: Vec<FilterChain>,
    outputs: Vec<String>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain(mut self, chain: FilterChain) -> Self {
        self.chains.push(chain);
        self
    }

    /// Declare a link label as a final graph output
    pub fn output<S: Into<String>>(mut self, label: S) -> Self {
        self.outputs.push(label.into());
        self
    }

    pub fn chains(&self) -> &[FilterChain] {
        &self.chains
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Check the label and acyclicity invariants
    ///
    /// Every link label must be produced by exactly one chain and consumed
    /// exactly once, either by a chain input or as a declared output.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.outputs.is_empty() {
            return Err(invalid("graph declares no outputs"));
        }

        let mut producers: HashMap<&str, usize> = HashMap::new();
        for (index, chain) in self.chains.iter().enumerate() {
            if chain.filters.is_empty() {
                return Err(invalid(format!("chain {} has no filters", index)));
            }
            for label in &chain.outputs {
                if producers.insert(label.as_str(), index).is_some() {
                    return Err(invalid(format!("label '{}' is produced more than once", label)));
                }
            }
        }

        let mut consumers: HashMap<&str, usize> = HashMap::new();
        let consumed = self
            .chains
            .iter()
            .flat_map(|chain| chain.linked_inputs())
            .chain(self.outputs.iter().map(String::as_str));
        for label in consumed {
            if !producers.contains_key(label) {
                return Err(invalid(format!("label '{}' is consumed but never produced", label)));
            }
            *consumers.entry(label).or_default() += 1;
        }

        for label in producers.keys() {
            match consumers.get(label).copied().unwrap_or(0) {
                0 => return Err(invalid(format!("label '{}' is produced but never consumed", label))),
                1 => {}
                _ => return Err(invalid(format!("label '{}' is consumed more than once", label))),
            }
        }

        self.check_acyclic(&producers)
    }

    fn check_acyclic(&self, producers: &HashMap<&str, usize>) -> Result<(), RenderError> {
        let mut in_degree = vec![0usize; self.chains.len()];
        let mut edges: Vec<Vec<usize>> = vec![Vec::new(); self.chains.len()];

        for (consumer, chain) in self.chains.iter().enumerate() {
            for label in chain.linked_inputs() {
                let producer = producers[label];
                edges[producer].push(consumer);
                in_degree[consumer] += 1;
            }
        }

        let mut ready: VecDeque<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(index, _)| index)
            .collect();
        let mut visited = 0;

        while let Some(index) = ready.pop_front() {
            visited += 1;
            for &next in &edges[index] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push_back(next);
                }
            }
        }

        if visited != self.chains.len() {
            return Err(invalid("graph contains a cycle"));
        }
        Ok(())
    }

    /// Serialize to ffmpeg's `-filter_complex` syntax
    pub fn to_filter_complex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chain) in self.chains.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}", chain)?;
        }
        Ok(())
    }
}

fn invalid<S: Into<String>>(reason: S) -> RenderError {
    RenderError::InvalidGraph { reason: reason.into() }
}
