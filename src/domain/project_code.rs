use time::OffsetDateTime;

const FALLBACK_ABBREVIATION: &str = "GEN";

/// Human-readable project code: `P{year}-{CAT}-{NNNN}`.
///
/// `CAT` is the first three characters of the category name, uppercased, or
/// `GEN` when no category name is known. `NNNN` is the last four digits of the
/// creation instant in milliseconds.
pub fn project_code(category_name: Option<&str>, created_at: OffsetDateTime) -> String {
    let abbreviation = category_name
        .map(|name| name.chars().take(3).collect::<String>().to_uppercase())
        .filter(|abbr| !abbr.is_empty())
        .unwrap_or_else(|| FALLBACK_ABBREVIATION.to_string());
    let millis = created_at.unix_timestamp_nanos() / 1_000_000;
    let suffix = millis.rem_euclid(10_000);

    format!("P{}-{abbreviation}-{suffix:04}", created_at.year())
}
