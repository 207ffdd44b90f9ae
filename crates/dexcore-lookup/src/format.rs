use dexcore_catalog::LookupKey;

/// Uppercases the first character and leaves the rest untouched.
pub fn capitalize_first(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn format_record_number(id: LookupKey) -> String {
    format!("#{id}")
}
