//! Part-name arithmetic
//!
//! Package part names always use `/`, independent of the host platform,
//! so these helpers work on strings rather than `std::path`.

/// Directory of a part, with trailing slash (`word/document.xml` -> `word/`)
pub fn directory(location: &str) -> &str {
    match location.rfind('/') {
        Some(index) => &location[..=index],
        None => "",
    }
}

/// File name of a part (`word/document.xml` -> `document.xml`)
pub fn file_name(location: &str) -> &str {
    location.rsplit('/').next().unwrap_or(location)
}

/// Extension of a part name, without the dot (`media/a.PNG` -> `PNG`)
pub fn extension(location: &str) -> &str {
    let name = file_name(location);
    match name.rfind('.') {
        Some(index) => &name[index + 1..],
        None => "",
    }
}

/// Location of the relationships manifest that belongs to a part
///
/// The package root (empty location) owns `_rels/.rels`.
pub fn rels_location(location: &str) -> String {
    format!("{}_rels/{}.rels", directory(location), file_name(location))
}

/// Resolve a relationship target against the directory of its owner
///
/// Absolute targets (leading `/`) are rooted at the package.
pub fn resolve(base_dir: &str, target: &str) -> String {
    let (mut components, rest): (Vec<&str>, &str) = match target.strip_prefix('/') {
        Some(absolute) => (Vec::new(), absolute),
        None => (
            base_dir.split('/').filter(|s| !s.is_empty()).collect(),
            target,
        ),
    };

    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            other => components.push(other),
        }
    }

    components.join("/")
}

/// Express `target` relative to the directory `base_dir`
pub fn relative(base_dir: &str, target: &str) -> String {
    let base: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    let target_parts: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();

    let common = base
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = std::iter::repeat("..").take(base.len() - common).collect();
    parts.extend(&target_parts[common..]);
    parts.join("/")
}
