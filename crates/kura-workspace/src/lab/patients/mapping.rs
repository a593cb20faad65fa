use std::collections::{BTreeMap, HashSet};

use super::domain::{ColumnMapping, PatientField};
use super::normalizer::normalize_header;

/// Substrings that identify each target field, checked in `PatientField::ordered` order.
const CONTAINS_RULES: &[(PatientField, &[&str])] = &[
    (
        PatientField::DocumentId,
        &["document", "documento", "cedula", "identificacion", "dni"],
    ),
    (
        PatientField::FullName,
        &["nombre", "name", "paciente", "patient"],
    ),
    (PatientField::Email, &["email", "correo", "mail"]),
    (
        PatientField::Phone,
        &["telefono", "phone", "celular", "movil", "tel"],
    ),
];

/// Headers that only identify a field when they match exactly.
const EXACT_RULES: &[(PatientField, &str)] = &[(PatientField::DocumentId, "id")];

fn matches_field(field: PatientField, normalized: &str) -> bool {
    let exact = EXACT_RULES
        .iter()
        .any(|(candidate, header)| *candidate == field && normalized == *header);

    exact
        || CONTAINS_RULES
            .iter()
            .filter(|(candidate, _)| *candidate == field)
            .any(|(_, needles)| needles.iter().any(|needle| normalized.contains(needle)))
}

/// Guesses which header feeds each field. Every field is claimed at most once
/// and the first header that matches wins.
pub(crate) fn suggest_mapping(headers: &[String]) -> ColumnMapping {
    let mut mapping = BTreeMap::new();
    let mut claimed = HashSet::new();

    for header in headers {
        let normalized = normalize_header(header);
        let field = PatientField::ordered()
            .into_iter()
            .filter(|field| !claimed.contains(field))
            .find(|field| matches_field(*field, &normalized));

        if let Some(field) = field {
            claimed.insert(field);
            mapping.insert(header.clone(), field);
        }
    }

    mapping
}

/// Required fields the mapping leaves uncovered.
pub(crate) fn missing_required(mapping: &ColumnMapping) -> Vec<PatientField> {
    PatientField::ordered()
        .into_iter()
        .filter(|field| field.required())
        .filter(|field| !mapping.values().any(|mapped| mapped == field))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn recognizes_spanish_export_headers() {
        let mapping = suggest_mapping(&headers(&[
            "Cédula",
            "Nombre Completo",
            "Correo Electrónico",
            "Teléfono",
        ]));
        assert_eq!(mapping.get("Cédula"), Some(&PatientField::DocumentId));
        assert_eq!(mapping.get("Nombre Completo"), Some(&PatientField::FullName));
        assert_eq!(mapping.get("Correo Electrónico"), Some(&PatientField::Email));
        assert_eq!(mapping.get("Teléfono"), Some(&PatientField::Phone));
    }

    #[test]
    fn recognizes_english_and_short_headers() {
        let mapping = suggest_mapping(&headers(&["ID", "Patient", "E-mail", "Tel"]));
        assert_eq!(mapping.get("ID"), Some(&PatientField::DocumentId));
        assert_eq!(mapping.get("Patient"), Some(&PatientField::FullName));
        assert_eq!(mapping.get("E-mail"), Some(&PatientField::Email));
        assert_eq!(mapping.get("Tel"), Some(&PatientField::Phone));
    }

    #[test]
    fn first_matching_header_claims_the_field() {
        let mapping = suggest_mapping(&headers(&["Nombre", "Nombre de acudiente", "Notas"]));
        assert_eq!(mapping.get("Nombre"), Some(&PatientField::FullName));
        assert!(!mapping.contains_key("Nombre de acudiente"));
        assert!(!mapping.contains_key("Notas"));
        assert_eq!(missing_required(&mapping), vec![PatientField::DocumentId]);
    }

    #[test]
    fn matching_is_by_substring_except_for_bare_id() {
        let mapping = suggest_mapping(&headers(&["Patient ID", "CC", "Telf", "Ciudad"]));
        assert_eq!(mapping.get("Patient ID"), Some(&PatientField::FullName));
        assert_eq!(mapping.get("Telf"), Some(&PatientField::Phone));
        assert!(!mapping.contains_key("CC"));
        assert!(!mapping.contains_key("Ciudad"));

        let mapping = suggest_mapping(&headers(&["Hotel"]));
        assert_eq!(mapping.get("Hotel"), Some(&PatientField::Phone));
    }
}
