//! Textual `.snps` descriptor format
//!
//! Line-oriented text; `#`-prefixed comments and blank lines are ignored.
//! The first significant line must be the neuron header `*N`. Neuron lines
//! have the shape
//!
//! ```text
//! <id> <initial_count> <verbose:0|1> <rule_count> (<consume> <produce> <delay> <threshold>){rule_count}
//! ```
//!
//! A line equal to `*S` ends the neuron section and begins the synapse
//! section, where each line is `<source_id> <target_id>`. A descriptor with
//! no synapse section, or with zero synapses, is rejected.

use crate::{
    error::{ModelError, Result},
    ids::NeuronId,
    neuron::Neuron,
    rule::Rule,
    synapse::Synapse,
};

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::str::SplitWhitespace;

/// Marker line that opens the neuron section
pub const NEURON_HEADER: &str = "*N";

/// Marker line that opens the synapse section
pub const SYNAPSE_HEADER: &str = "*S";

/// Conventional file extension for descriptors
pub const FILE_EXTENSION: &str = "snps";

/// Parser section state
enum Section {
    Preamble,
    Neurons,
    Synapses,
}

/// Parsed descriptor: the neuron/synapse graph of one SN-P system
#[derive(Debug, Clone, Default)]
pub struct Descriptor {
    /// Neurons in declaration order
    pub neurons: Vec<Neuron>,
    /// Synapses in declaration order
    pub synapses: Vec<Synapse>,
}

impl Descriptor {
    /// Parse a descriptor from text
    pub fn parse(text: &str) -> Result<Self> {
        let mut neurons: Vec<Neuron> = Vec::new();
        let mut synapses: Vec<Synapse> = Vec::new();
        let mut declared: HashSet<NeuronId> = HashSet::new();
        let mut section = Section::Preamble;

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let number = index + 1;

            match section {
                Section::Preamble => {
                    if line != NEURON_HEADER {
                        return Err(ModelError::invalid_header(line));
                    }
                    section = Section::Neurons;
                }
                Section::Neurons => {
                    if line == SYNAPSE_HEADER {
                        section = Section::Synapses;
                    } else {
                        let neuron = parse_neuron_line(line, number)?;
                        if !declared.insert(neuron.id().clone()) {
                            return Err(ModelError::duplicate_neuron(neuron.id().clone()));
                        }
                        neurons.push(neuron);
                    }
                }
                Section::Synapses => {
                    let synapse = parse_synapse_line(line, number)?;
                    if !declared.contains(&synapse.source) {
                        return Err(ModelError::unknown_neuron(synapse.source));
                    }
                    if !declared.contains(&synapse.target) {
                        return Err(ModelError::unknown_neuron(synapse.target));
                    }
                    synapses.push(synapse);
                }
            }
        }

        if !matches!(section, Section::Synapses) {
            return Err(ModelError::MissingSynapseSection);
        }
        if synapses.is_empty() {
            return Err(ModelError::EmptySynapseSection);
        }

        Ok(Self { neurons, synapses })
    }

    /// Read and parse a descriptor file
    pub fn read_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Render the descriptor back to its textual form
    ///
    /// Predicate-form rules have no textual representation and are rejected.
    pub fn to_text(&self) -> Result<String> {
        let mut out = String::new();
        out.push_str("# SN-P system descriptor\n");
        out.push_str(NEURON_HEADER);
        out.push('\n');

        for neuron in &self.neurons {
            let mut line = format!(
                "{} {} {} {}",
                neuron.id(),
                neuron.spikes(),
                neuron.verbose() as u8,
                neuron.rules().len()
            );
            for rule in neuron.rules() {
                let threshold = rule
                    .condition()
                    .threshold()
                    .ok_or_else(|| ModelError::unsupported_rule(neuron.id().clone()))?;
                line.push_str(&format!(
                    " {} {} {} {}",
                    rule.consume(),
                    rule.produce(),
                    rule.delay(),
                    threshold
                ));
            }
            out.push_str(&line);
            out.push('\n');
        }

        out.push_str(SYNAPSE_HEADER);
        out.push('\n');
        for synapse in &self.synapses {
            out.push_str(&format!("{} {}\n", synapse.source, synapse.target));
        }

        Ok(out)
    }

    /// Render and write the descriptor to a file
    pub fn write_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = self.to_text()?;
        fs::write(path, text)?;
        Ok(())
    }
}

/// Parse one whitespace-separated field of a neuron or synapse line
fn parse_field<T: std::str::FromStr>(
    fields: &mut SplitWhitespace<'_>,
    number: usize,
    what: &str,
) -> Result<T> {
    let token = fields
        .next()
        .ok_or_else(|| ModelError::parse_line(number, format!("missing {}", what)))?;
    token
        .parse()
        .map_err(|_| ModelError::parse_line(number, format!("invalid {}: `{}`", what, token)))
}

fn parse_neuron_line(line: &str, number: usize) -> Result<Neuron> {
    let mut fields = line.split_whitespace();

    let id = fields
        .next()
        .ok_or_else(|| ModelError::parse_line(number, "missing neuron id"))?;
    let spikes: u64 = parse_field(&mut fields, number, "initial spike count")?;
    let verbose = match fields.next() {
        Some("0") => false,
        Some("1") => true,
        Some(other) => {
            return Err(ModelError::parse_line(
                number,
                format!("invalid verbose flag `{}` (expected 0 or 1)", other),
            ))
        }
        None => return Err(ModelError::parse_line(number, "missing verbose flag")),
    };
    let rule_count: usize = parse_field(&mut fields, number, "rule count")?;

    let mut rules = Vec::with_capacity(rule_count);
    for _ in 0..rule_count {
        let consume: u64 = parse_field(&mut fields, number, "rule consume")?;
        let produce: u64 = parse_field(&mut fields, number, "rule produce")?;
        let delay: u32 = parse_field(&mut fields, number, "rule delay")?;
        let threshold: u64 = parse_field(&mut fields, number, "rule threshold")?;
        let rule = Rule::threshold(consume, produce, delay, threshold)
            .map_err(|err| ModelError::parse_line(number, err.to_string()))?;
        rules.push(rule);
    }

    if let Some(extra) = fields.next() {
        return Err(ModelError::parse_line(
            number,
            format!("unexpected trailing field `{}`", extra),
        ));
    }

    Ok(Neuron::new(id, spikes)
        .with_verbose(verbose)
        .with_rules(rules))
}

fn parse_synapse_line(line: &str, number: usize) -> Result<Synapse> {
    let mut fields = line.split_whitespace();

    let source = fields
        .next()
        .ok_or_else(|| ModelError::parse_line(number, "missing synapse source id"))?;
    let target = fields
        .next()
        .ok_or_else(|| ModelError::parse_line(number, "missing synapse target id"))?;

    if let Some(extra) = fields.next() {
        return Err(ModelError::parse_line(
            number,
            format!("unexpected trailing field `{}`", extra),
        ));
    }

    Ok(Synapse::new(source, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = "\
# relay chain: N1 -> N2 -> N3
*N
N1 1 1 1 1 1 1 1
N2 0 1 1 1 1 1 1
N3 0 1 0
*S
N1 N2
N2 N3
";

    #[test]
    fn test_parse_example() {
        let descriptor = Descriptor::parse(EXAMPLE).unwrap();
        assert_eq!(descriptor.neurons.len(), 3);
        assert_eq!(descriptor.synapses.len(), 2);

        let n1 = &descriptor.neurons[0];
        assert_eq!(n1.id().as_str(), "N1");
        assert_eq!(n1.spikes(), 1);
        assert!(n1.verbose());
        assert_eq!(n1.rules().len(), 1);
        assert_eq!(n1.rules()[0].consume(), 1);
        assert_eq!(n1.rules()[0].condition().threshold(), Some(1));

        let n3 = &descriptor.neurons[2];
        assert!(n3.rules().is_empty());

        assert_eq!(descriptor.synapses[0], Synapse::new("N1", "N2"));
        assert_eq!(descriptor.synapses[1], Synapse::new("N2", "N3"));
    }

    #[test]
    fn test_invalid_header_rejected() {
        let err = Descriptor::parse("invalid content\n").unwrap_err();
        assert!(matches!(err, ModelError::InvalidHeader { .. }));
    }

    #[test]
    fn test_missing_synapse_section_rejected() {
        let err = Descriptor::parse("*N\nN1 0 0 0\n").unwrap_err();
        assert!(matches!(err, ModelError::MissingSynapseSection));
    }

    #[test]
    fn test_empty_synapse_section_rejected() {
        let err = Descriptor::parse("*N\nN1 0 0 0\n*S\n").unwrap_err();
        assert!(matches!(err, ModelError::EmptySynapseSection));
    }

    #[test]
    fn test_duplicate_neuron_rejected() {
        let text = "*N\nN1 0 0 0\nN1 2 0 0\n*S\nN1 N1\n";
        let err = Descriptor::parse(text).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateNeuron { .. }));
    }

    #[test]
    fn test_unknown_synapse_endpoint_rejected() {
        let text = "*N\nN1 0 0 0\n*S\nN1 N9\n";
        let err = Descriptor::parse(text).unwrap_err();
        assert!(matches!(err, ModelError::UnknownNeuron { .. }));
    }

    #[test]
    fn test_malformed_lines_rejected() {
        // Bad verbose flag
        let err = Descriptor::parse("*N\nN1 0 2 0\n*S\nN1 N1\n").unwrap_err();
        assert!(matches!(err, ModelError::ParseLine { line: 2, .. }));

        // Rule count promises more fields than the line carries
        let err = Descriptor::parse("*N\nN1 0 0 1 1 1\n*S\nN1 N1\n").unwrap_err();
        assert!(matches!(err, ModelError::ParseLine { line: 2, .. }));

        // Trailing garbage after the declared rules
        let err = Descriptor::parse("*N\nN1 0 0 0 7\n*S\nN1 N1\n").unwrap_err();
        assert!(matches!(err, ModelError::ParseLine { line: 2, .. }));

        // Zero-consume rule
        let err = Descriptor::parse("*N\nN1 0 0 1 0 1 0 1\n*S\nN1 N1\n").unwrap_err();
        assert!(matches!(err, ModelError::ParseLine { line: 2, .. }));
    }

    #[test]
    fn test_text_round_trip() {
        let descriptor = Descriptor::parse(EXAMPLE).unwrap();
        let text = descriptor.to_text().unwrap();
        let reparsed = Descriptor::parse(&text).unwrap();

        assert_eq!(reparsed.neurons.len(), descriptor.neurons.len());
        assert_eq!(reparsed.synapses, descriptor.synapses);
        for (a, b) in reparsed.neurons.iter().zip(&descriptor.neurons) {
            assert_eq!(a.id(), b.id());
            assert_eq!(a.spikes(), b.spikes());
            assert_eq!(a.verbose(), b.verbose());
            assert_eq!(a.rules().len(), b.rules().len());
            for (ra, rb) in a.rules().iter().zip(b.rules()) {
                assert_eq!(ra.consume(), rb.consume());
                assert_eq!(ra.produce(), rb.produce());
                assert_eq!(ra.delay(), rb.delay());
                assert_eq!(ra.condition().threshold(), rb.condition().threshold());
            }
        }
    }

    #[test]
    fn test_predicate_rules_have_no_textual_form() {
        let rule = Rule::custom(1, 1, 0, |count| count > 2).unwrap();
        let descriptor = Descriptor {
            neurons: vec![Neuron::new("N1", 0).with_rules(vec![rule])],
            synapses: vec![Synapse::new("N1", "N1")],
        };
        let err = descriptor.to_text().unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedRule { .. }));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("relay.{}", FILE_EXTENSION));

        let descriptor = Descriptor::parse(EXAMPLE).unwrap();
        descriptor.write_path(&path).unwrap();

        let reloaded = Descriptor::read_path(&path).unwrap();
        assert_eq!(reloaded.neurons.len(), 3);
        assert_eq!(reloaded.synapses, descriptor.synapses);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Descriptor::read_path("/nonexistent/model.snps").unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
    }
}
