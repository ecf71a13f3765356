use chem_agent::agent::tools;

fn call(tool: &str, smiles: &str) -> tools::ToolOutcome {
    let args = serde_json::json!({ "smiles": smiles }).to_string();
    tools::dispatch(tool, &args)
}

#[test]
fn validate_valid_smiles() {
    for smiles in ["C1CCCCC1", "CCO", "c1ccccc1", "[NH4+]", "OC(=O)C[C@H](N)C(=O)O"] {
        let outcome = call("validate_smiles", smiles);
        assert!(!outcome.is_error, "{smiles}: {}", outcome.content);
        assert_eq!(
            outcome.content,
            format!("The SMILES string {smiles} is valid.")
        );
    }
}

#[test]
fn validate_invalid_smiles() {
    for smiles in ["C1CC", "C(C", "CC)", "c1cccc1", "C(C)(C)(C)(C)C", "Xx", ""] {
        let outcome = call("validate_smiles", smiles);
        assert!(!outcome.is_error, "{smiles}: {}", outcome.content);
        assert!(
            outcome
                .content
                .starts_with(&format!("The SMILES string {smiles} is invalid.")),
            "{smiles}: {}",
            outcome.content
        );
        assert!(!outcome.content.contains("is valid."));
    }
}

#[test]
fn molecular_weight_of_aspirin() {
    let outcome = call("calculate_molecular_weight", "CC(=O)OC1=CC=CC=C1C(=O)O");
    assert!(!outcome.is_error);
    assert!(outcome.content.ends_with("is 180.16 g/mol."), "{}", outcome.content);
}

#[test]
fn logp_of_ethanol() {
    let outcome = call("calculate_logp", "CCO");
    assert!(!outcome.is_error);
    assert_eq!(
        outcome.content,
        "The logP of the molecule with SMILES CCO is -0.00."
    );
}

#[test]
fn malformed_input_never_panics() {
    let garbage = [
        "", "(", ")", "[", "]", "%", "%1", "C%", "1", "=C", "C=", "C..C", "[C", "[Zz]", "c",
        "C1=CC=C", "[13]", "[C+++++++++]", "C((C))", "C$$C", "\u{2603}", "C1CC1%99",
    ];
    for tool in ["validate_smiles", "calculate_molecular_weight", "calculate_logp"] {
        for input in garbage {
            let outcome = call(tool, input);
            let lower = outcome.content.to_lowercase();
            if tool == "validate_smiles" {
                assert!(lower.contains("valid"), "{tool}({input:?}): {lower}");
            } else if outcome.is_error {
                assert!(
                    lower.contains("invalid") || lower.contains("error"),
                    "{tool}({input:?}): {lower}"
                );
            }
        }
    }
}

#[test]
fn invalid_smiles_for_calculators() {
    for tool in ["calculate_molecular_weight", "calculate_logp"] {
        let outcome = call(tool, "C1CC");
        assert!(outcome.is_error);
        assert!(outcome.content.starts_with("Invalid SMILES string."));
    }
}

#[test]
fn bad_arguments_are_tool_errors() {
    let cases = [
        ("calculate_logp", "{}"),
        ("calculate_logp", r#"{"smiles": null}"#),
        ("calculate_logp", r#"{"smiles": 42}"#),
        ("calculate_logp", "{not json"),
        ("calculate_logp", r#""CCO""#),
        ("draw_molecule", r#"{"smiles": "CCO"}"#),
    ];
    for (tool, args) in cases {
        let outcome = tools::dispatch(tool, args);
        assert!(outcome.is_error, "{tool} {args}");
        assert!(outcome.content.starts_with("Error: "), "{}", outcome.content);
    }
}

#[test]
fn unknown_tool_is_named() {
    let outcome = tools::dispatch("draw_molecule", "{}");
    assert_eq!(outcome.content, "Error: unknown tool: draw_molecule");
}

#[test]
fn many_aromatic_components_are_judged_quickly() {
    let started = std::time::Instant::now();
    let bad = format!("{}c1cccc1", "c1ccccc1.".repeat(22));
    let outcome = call("validate_smiles", &bad);
    assert!(outcome.content.contains("is invalid."), "{}", outcome.content);

    let good = format!("{}c1ccccc1", "c1ccccc1.".repeat(40));
    let outcome = call("calculate_molecular_weight", &good);
    assert!(!outcome.is_error, "{}", outcome.content);
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
}

#[test]
fn implicit_biphenyl_bond() {
    let outcome = call("calculate_logp", "c1ccccc1c1ccccc1");
    assert_eq!(
        outcome.content,
        "The logP of the molecule with SMILES c1ccccc1c1ccccc1 is 3.35."
    );
}

#[test]
fn metal_hydrogen_limits() {
    for tool in ["calculate_molecular_weight", "calculate_logp"] {
        for smiles in ["[FeH255][H]", "[PtH20]"] {
            let outcome = call(tool, smiles);
            assert!(outcome.is_error, "{tool}({smiles}): {}", outcome.content);
            assert!(outcome.content.starts_with("Invalid SMILES string."));
        }
    }
    let outcome = call("validate_smiles", "[FeH255][H]");
    assert!(outcome.content.contains("is invalid."));
}

#[test]
fn metals_and_wildcards_are_valid() {
    for smiles in ["[Pd]", "[Gd+3]", "C*", "[Mo]", "[Zr+4]", "[U]", "[*]"] {
        let outcome = call("validate_smiles", smiles);
        assert_eq!(outcome.content, format!("The SMILES string {smiles} is valid."));
    }
}
