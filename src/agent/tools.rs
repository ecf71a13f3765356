//! Cheminformatics tools exposed to the model.
//!
//! Three tools, each taking a single `smiles` argument: `validate_smiles`,
//! `calculate_molecular_weight`, and `calculate_logp`. Every tool returns a
//! typed `Result`; [`dispatch`] is the only place it becomes text.

use crate::chem::{self, SmilesError};
use crate::llm::ToolDef;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

pub const VALIDATE_SMILES: &str = "validate_smiles";
pub const CALCULATE_MOLECULAR_WEIGHT: &str = "calculate_molecular_weight";
pub const CALCULATE_LOGP: &str = "calculate_logp";

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid SMILES string.")]
    InvalidSmiles {
        smiles: String,
        #[source]
        source: SmilesError,
    },

    #[error("missing required argument `{0}`")]
    MissingArgument(&'static str),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

impl ToolError {
    /// Text handed back to the model.
    pub fn render(&self) -> String {
        match self {
            ToolError::InvalidSmiles { source, .. } => format!("{self}\nReason: {source}"),
            _ => format!("Error: {self}"),
        }
    }
}

/// Successful tool answer. `reason` carries the parser's explanation when a
/// structure was judged invalid.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolReport {
    pub text: String,
    pub reason: Option<String>,
}

impl ToolReport {
    fn plain(text: String) -> Self {
        Self { text, reason: None }
    }

    pub fn render(&self) -> String {
        match &self.reason {
            Some(reason) => format!("{}\nReason: {reason}", self.text),
            None => self.text.clone(),
        }
    }
}

/// Rendered result of one tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub content: String,
    pub is_error: bool,
}

impl From<Result<ToolReport, ToolError>> for ToolOutcome {
    fn from(result: Result<ToolReport, ToolError>) -> Self {
        match result {
            Ok(report) => Self {
                content: report.render(),
                is_error: false,
            },
            Err(e) => Self {
                content: e.render(),
                is_error: true,
            },
        }
    }
}

fn smiles_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "smiles": {
                "type": "string",
                "description": description
            }
        },
        "required": ["smiles"]
    })
}

/// Build the tool definitions sent to the LLM.
pub fn tool_definitions() -> Vec<ToolDef> {
    vec![
        ToolDef {
            name: VALIDATE_SMILES.into(),
            description: "Validate a SMILES string. Reports whether the string describes a \
                          chemically valid structure."
                .into(),
            input_schema: smiles_schema("The SMILES string to validate."),
        },
        ToolDef {
            name: CALCULATE_MOLECULAR_WEIGHT.into(),
            description: "Calculate the average molecular weight in g/mol of the molecule \
                          described by a SMILES string, implicit hydrogens included."
                .into(),
            input_schema: smiles_schema("SMILES string of the molecule."),
        },
        ToolDef {
            name: CALCULATE_LOGP.into(),
            description: "Calculate the octanol/water partition coefficient (Wildman-Crippen \
                          logP) of the molecule described by a SMILES string."
                .into(),
            input_schema: smiles_schema("SMILES string of the molecule."),
        },
    ]
}

/// Dispatch a tool call by name. `arguments` is the raw JSON string the model
/// sent; an empty string is treated as `{}`.
pub fn dispatch(tool_name: &str, arguments: &str) -> ToolOutcome {
    debug!(tool = %tool_name, arguments, "dispatching tool call");
    run(tool_name, arguments).into()
}

fn run(tool_name: &str, arguments: &str) -> Result<ToolReport, ToolError> {
    let tool: fn(&str) -> Result<ToolReport, ToolError> = match tool_name {
        VALIDATE_SMILES => |s| Ok(validate_smiles(s)),
        CALCULATE_MOLECULAR_WEIGHT => calculate_molecular_weight,
        CALCULATE_LOGP => calculate_logp,
        _ => return Err(ToolError::UnknownTool(tool_name.to_string())),
    };
    let input = decode_arguments(arguments)?;
    let smiles = smiles_argument(&input)?;
    tool(smiles)
}

fn decode_arguments(arguments: &str) -> Result<Value, ToolError> {
    if arguments.trim().is_empty() {
        return Ok(json!({}));
    }
    let value: Value = serde_json::from_str(arguments)
        .map_err(|e| ToolError::InvalidArguments(format!("not valid JSON: {e}")))?;
    if !value.is_object() {
        return Err(ToolError::InvalidArguments(
            "arguments must be a JSON object".into(),
        ));
    }
    Ok(value)
}

fn smiles_argument(input: &Value) -> Result<&str, ToolError> {
    match input.get("smiles") {
        None | Some(Value::Null) => Err(ToolError::MissingArgument("smiles")),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(ToolError::InvalidArguments(format!(
            "`smiles` must be a string, got {other}"
        ))),
    }
}

fn parse(smiles: &str) -> Result<chem::Molecule, ToolError> {
    chem::parse(smiles).map_err(|source| ToolError::InvalidSmiles {
        smiles: smiles.to_string(),
        source,
    })
}

/// Never fails: an unparseable string is a valid answer ("invalid").
pub fn validate_smiles(smiles: &str) -> ToolReport {
    match chem::parse(smiles) {
        Ok(_) => ToolReport::plain(format!("The SMILES string {smiles} is valid.")),
        Err(e) => ToolReport {
            text: format!("The SMILES string {smiles} is invalid."),
            reason: Some(e.to_string()),
        },
    }
}

pub fn calculate_molecular_weight(smiles: &str) -> Result<ToolReport, ToolError> {
    let mol = parse(smiles)?;
    let mw = chem::molecular_weight(&mol);
    Ok(ToolReport::plain(format!(
        "The molecular weight of the molecule with SMILES {smiles} is {mw:.2} g/mol."
    )))
}

pub fn calculate_logp(smiles: &str) -> Result<ToolReport, ToolError> {
    let mol = parse(smiles)?;
    let logp = chem::crippen_logp(&mol);
    Ok(ToolReport::plain(format!(
        "The logP of the molecule with SMILES {smiles} is {logp:.2}."
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_cover_all_tools() {
        let defs = tool_definitions();
        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, [VALIDATE_SMILES, CALCULATE_MOLECULAR_WEIGHT, CALCULATE_LOGP]);
        for def in &defs {
            assert_eq!(def.input_schema["required"][0], "smiles");
        }
    }

    #[test]
    fn validate_reports_reason_for_invalid() {
        let report = validate_smiles("C1CC");
        assert_eq!(report.text, "The SMILES string C1CC is invalid.");
        assert!(report.reason.as_deref().unwrap().contains("ring bond 1"));
        assert!(report.render().contains("\nReason: "));
    }

    #[test]
    fn molecular_weight_message() {
        let report = calculate_molecular_weight("CC(=O)OC1=CC=CC=C1C(=O)O").unwrap();
        assert_eq!(
            report.text,
            "The molecular weight of the molecule with SMILES CC(=O)OC1=CC=CC=C1C(=O)O is 180.16 g/mol."
        );
    }

    #[test]
    fn logp_message() {
        let report = calculate_logp("CCO").unwrap();
        assert_eq!(report.text, "The logP of the molecule with SMILES CCO is -0.00.");
    }

    #[test]
    fn invalid_smiles_renders_short_message() {
        let err = calculate_logp("C(").unwrap_err();
        assert!(matches!(err, ToolError::InvalidSmiles { .. }));
        assert!(err.render().starts_with("Invalid SMILES string."));
    }

    #[test]
    fn argument_errors() {
        assert!(matches!(
            run(CALCULATE_LOGP, "{}"),
            Err(ToolError::MissingArgument("smiles"))
        ));
        assert!(matches!(
            run(CALCULATE_LOGP, r#"{"smiles": 5}"#),
            Err(ToolError::InvalidArguments(_))
        ));
        assert!(matches!(
            run(CALCULATE_LOGP, "[1,2]"),
            Err(ToolError::InvalidArguments(_))
        ));
        assert!(matches!(
            run("draw_molecule", "{}"),
            Err(ToolError::UnknownTool(_))
        ));
    }
}
