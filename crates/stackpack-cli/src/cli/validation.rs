/// Parse a `package=Global` mapping for `--global`.
///
/// The global must be a JavaScript identifier, optionally a dotted member
/// path such as `React.DOM`:
/// - each segment starts with a letter, underscore, or dollar sign
/// - and continues with letters, numbers, underscores, or dollar signs
///
/// # Examples
///
/// Valid: `jquery=jQuery`, `lodash=_`, `react-dom=React.DOM`
/// Invalid: `jquery`, `=jQuery`, `jquery=`, `moment=1moment`, `x=my-lib`
///
/// # Errors
///
/// Returns an error message if the mapping or the identifier is invalid.
pub fn parse_global(s: &str) -> Result<(String, String), String> {
    let Some((package, global)) = s.split_once('=') else {
        return Err(format!("Expected PACKAGE=GLOBAL, got '{}'", s));
    };

    let package = package.trim();
    if package.is_empty() {
        return Err("Package name cannot be empty".to_string());
    }

    validate_identifier(global.trim())?;

    Ok((package.to_string(), global.trim().to_string()))
}

/// Validate a global name, allowing `.`-separated member access.
pub(crate) fn validate_identifier(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Global name cannot be empty".to_string());
    }

    for segment in name.split('.') {
        let mut chars = segment.chars();
        let Some(first) = chars.next() else {
            return Err(format!("Global name has an empty segment: '{}'", name));
        };

        if !first.is_alphabetic() && first != '_' && first != '$' {
            return Err(format!(
                "Global name must start with a letter, underscore, or dollar sign: '{}'",
                name
            ));
        }

        if chars.any(|c| !c.is_alphanumeric() && c != '_' && c != '$') {
            return Err(format!(
                "Global name can only contain letters, numbers, underscores, or dollar signs: '{}'",
                name
            ));
        }
    }

    Ok(())
}
