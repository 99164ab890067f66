//! Name resolution against the frozen catalog

use super::catalog::ClassCatalog;
use super::references::ImportScope;

/// Split a type expression into the simple or dotted names it mentions.
///
/// `Dictionary<string, List<Foo>>[]?` yields `Dictionary`, `string`, `List`
/// and `Foo`. Tuple parentheses, array ranks and nullable markers are
/// dropped along with the angle brackets.
pub fn type_names(expression: &str) -> Vec<String> {
    let expression = expression.replace("global::", "");
    expression
        .split(|c: char| matches!(c, '<' | '>' | ',' | '(' | ')' | '[' | ']' | '?' | '*') || c.is_whitespace())
        .map(|segment| segment.trim_matches('.'))
        .filter(|segment| !segment.is_empty())
        .filter(|segment| segment.chars().next().map_or(false, |c| c.is_alphabetic() || c == '_' || c == '@'))
        .map(|segment| segment.trim_start_matches('@').to_string())
        .collect()
}

/// Resolve one name to a cataloged fully-qualified name.
///
/// Dotted names are looked up as written, after alias expansion of their
/// first segment. Simple names are tried against each imported namespace,
/// then the declaring namespace, then the global namespace; the first hit
/// wins.
pub fn resolve_name(
    name: &str,
    imports: &ImportScope,
    own_namespace: Option<&str>,
    catalog: &ClassCatalog,
) -> Option<String> {
    let (head, rest) = match name.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (name, None),
    };

    if let Some(target) = imports.aliases.get(head) {
        let expanded = match rest {
            Some(rest) => format!("{}.{}", target, rest),
            None => target.clone(),
        };
        return catalog.contains(&expanded).then_some(expanded);
    }

    if rest.is_some() {
        return catalog.contains(name).then(|| name.to_string());
    }

    imports
        .namespaces
        .iter()
        .map(String::as_str)
        .chain(own_namespace)
        .map(|prefix| format!("{}.{}", prefix, name))
        .chain(std::iter::once(name.to_string()))
        .find(|candidate| catalog.contains(candidate))
}

/// Resolve every name in a type expression
pub fn resolve_expression(
    expression: &str,
    imports: &ImportScope,
    own_namespace: Option<&str>,
    catalog: &ClassCatalog,
) -> Vec<String> {
    type_names(expression)
        .iter()
        .filter_map(|name| resolve_name(name, imports, own_namespace, catalog))
        .collect()
}
