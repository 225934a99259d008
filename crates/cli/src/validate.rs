use std::path::Path;
use std::process;

use ledger_decode::ValidationError;
use ledger_types::{contract_with_policy, Contract, Descriptor, GrammarPolicy, Identifier};
use serde_json::{json, Value};

use crate::{report_error, OutputFormat};

/// Result of checking one contract from the input file.
struct Outcome {
    index: usize,
    contract: Option<(String, Identifier)>,
    error: Option<ValidationError>,
}

pub(crate) fn cmd_validate(
    file: &Path,
    template: Option<&Identifier>,
    grammar: GrammarPolicy,
    output: OutputFormat,
    quiet: bool,
) {
    let text = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading file '{}': {}", file.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let doc: Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("error parsing JSON in '{}': {}", file.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let items = match doc {
        Value::Array(items) => items,
        single => vec![single],
    };
    tracing::info!(file = %file.display(), contracts = items.len(), ?grammar, "validating contracts");

    let envelope = contract_with_policy(&Descriptor::<Value>::of(), grammar);
    let outcomes: Vec<Outcome> = items
        .iter()
        .enumerate()
        .map(|(index, item)| match check_contract(&envelope, item, template) {
            Ok(c) => Outcome {
                index,
                contract: Some((c.contract_id.into_inner(), c.template_id)),
                error: None,
            },
            Err(e) => Outcome {
                index,
                contract: None,
                error: Some(e),
            },
        })
        .collect();

    let failures = outcomes.iter().filter(|o| o.error.is_some()).count();
    match output {
        OutputFormat::Text => print_text(&outcomes, quiet),
        OutputFormat::Json => print_json(&outcomes),
    }

    if failures > 0 {
        process::exit(1);
    }
}

/// Decode one contract and check it belongs to `template`, if given.
fn check_contract(
    envelope: &Descriptor<Contract<Value>>,
    item: &Value,
    template: Option<&Identifier>,
) -> Result<Contract<Value>, ValidationError> {
    let decoded = envelope.decode(item)?;

    if let Some(expected) = template {
        if decoded.template_id != *expected {
            return Err(ValidationError::new(format!(
                "expected template {}, got {}",
                expected, decoded.template_id
            ))
            .at_key("templateId"));
        }
    }

    Ok(decoded)
}

fn print_text(outcomes: &[Outcome], quiet: bool) {
    for outcome in outcomes {
        match (&outcome.contract, &outcome.error) {
            (_, Some(e)) => println!("fail [{}] {}", outcome.index, e),
            (Some((cid, tid)), None) if !quiet => {
                println!("ok   [{}] {} ({})", outcome.index, cid, tid)
            }
            _ => {}
        }
    }
    if !quiet {
        let valid = outcomes.iter().filter(|o| o.error.is_none()).count();
        println!("{} of {} contracts valid", valid, outcomes.len());
    }
}

fn print_json(outcomes: &[Outcome]) {
    let report: Vec<Value> = outcomes
        .iter()
        .map(|o| match (&o.contract, &o.error) {
            (_, Some(e)) => json!({
                "index": o.index,
                "ok": false,
                "path": e.path().to_string(),
                "message": e.message(),
            }),
            (Some((cid, tid)), None) => json!({
                "index": o.index,
                "ok": true,
                "contractId": cid,
                "templateId": tid.to_string(),
            }),
            (None, None) => json!({ "index": o.index, "ok": true }),
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&Value::Array(report)).unwrap_or_default()
    );
}
