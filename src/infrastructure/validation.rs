//! Validator output flattened into domain errors

use validator::ValidationErrors;

use crate::domain::DomainError;

/// Flatten validator output into one message, fields in name order
///
/// Field names are reported the way they appear in request bodies.
pub fn validation_error(errors: ValidationErrors) -> DomainError {
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let reasons: Vec<String> = errs
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            format!("{}: {}", camel_case(field), reasons.join(", "))
        })
        .collect();
    fields.sort();

    DomainError::validation(fields.join("; "))
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;

    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }

    out
}
