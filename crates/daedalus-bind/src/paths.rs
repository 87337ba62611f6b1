//! Path-template translation.
//!
//! API descriptions declare dynamic path segments with brace placeholders
//! (`/pets/{petId}`); the router's native syntax is the leading-colon token
//! (`/pets/:petId`). [`translate`] converts the former to the latter.
//!
//! The translation is purely textual: parameter names are not checked for
//! well-formedness, and a template with an unbalanced brace passes through
//! untouched; the mismatch surfaces downstream when the router fails to
//! match.

/// Translates brace-delimited parameter tokens to colon syntax.
///
/// Every `{name}` token becomes `:name`; all other characters, including
/// surrounding literal segments, are preserved. Multiple tokens within a
/// single segment and across segments are supported.
///
/// # Example
///
/// ```
/// use daedalus_bind::paths::translate;
///
/// assert_eq!(translate("/pets/{petId}"), "/pets/:petId");
/// assert_eq!(
///     translate("/users/{id}/posts/{postId}"),
///     "/users/:id/posts/:postId"
/// );
/// ```
#[must_use]
pub fn translate(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open + 1..].find('}') else {
            // Unbalanced brace: pass the remainder through untouched.
            break;
        };

        out.push_str(&rest[..open]);
        out.push(':');
        out.push_str(&rest[open + 1..open + 1 + close]);
        rest = &rest[open + 1 + close + 1..];
    }

    out.push_str(rest);
    out
}
