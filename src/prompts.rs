pub const THUMBNAIL_SYSTEM: &str = include_str!("../data/prompts/thumbnail_system.txt");
pub const THUMBNAIL_USER: &str = include_str!("../data/prompts/thumbnail_user.txt");

/// Replace `{{key}}` placeholders in a template string.
///
/// Single pass over `template`: substituted values are never rescanned, so a
/// value containing `{{...}}` is written out verbatim. Unknown keys are kept.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find("}}") else {
            result.push_str(&rest[start..]);
            return result;
        };

        let key = &after[..end];
        match vars.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => result.push_str(value),
            None => result.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    result.push_str(rest);
    result
}
