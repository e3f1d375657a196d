use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cobertura::{Class, Coverage, Line, Method, Package, hit_rate};
use crate::error::CobertaError;
use crate::locate;
use crate::profile::Profile;
use crate::structure::{Declaration, SourcePos, StructureProvider};

const RECEIVERLESS_CLASS: &str = "-";

pub fn apply_profile(
    coverage: &mut Coverage,
    profile: &Profile,
    roots: &[PathBuf],
    provider: &dyn StructureProvider,
) -> Result<(), CobertaError> {
    let resolved = locate::find_file(&profile.file_name, roots)?;
    let declarations = provider.declarations(&resolved)?;

    let package_index = package_index(coverage, &package_name(&profile.file_name));
    let package = &mut coverage.packages[package_index];

    // Class identity is per source file: the same receiver name in another
    // file becomes a distinct class.
    let mut class_index_by_name: BTreeMap<String, usize> = BTreeMap::new();
    for declaration in &declarations {
        let method = collect_method(declaration, profile);
        let class_index = class_index(
            package,
            &mut class_index_by_name,
            declaration,
            &profile.file_name,
        );
        let class = &mut package.classes[class_index];
        class.lines.extend(method.lines.iter().copied());
        class.methods.push(method);
        class.line_rate = hit_rate(&class.lines);
        package.recompute_rate();
    }
    package.recompute_rate();
    Ok(())
}

// Directory portion of the report path, without the trailing separator. A
// bare file name falls into the empty-named package.
fn package_name(file_name: &str) -> String {
    match file_name.rfind('/') {
        Some(index) => file_name[..index].to_string(),
        None => String::new(),
    }
}

fn package_index(coverage: &mut Coverage, name: &str) -> usize {
    match coverage.packages.iter().position(|package| package.name == name) {
        Some(index) => index,
        None => {
            coverage.packages.push(Package::new(name.to_string()));
            coverage.packages.len() - 1
        }
    }
}

fn class_index(
    package: &mut Package,
    class_index_by_name: &mut BTreeMap<String, usize>,
    declaration: &Declaration,
    file_name: &str,
) -> usize {
    let class_name = declaration
        .receiver
        .clone()
        .unwrap_or_else(|| RECEIVERLESS_CLASS.to_string());
    if let Some(&index) = class_index_by_name.get(&class_name) {
        return index;
    }
    package
        .classes
        .push(Class::new(class_name.clone(), file_name.to_string()));
    let index = package.classes.len() - 1;
    class_index_by_name.insert(class_name, index);
    index
}

fn collect_method(declaration: &Declaration, profile: &Profile) -> Method {
    let mut method = Method::new(declaration.name.clone());
    for block in &profile.blocks {
        let block_start = SourcePos {
            line: block.start_line,
            col: block.start_col,
        };
        let block_end = SourcePos {
            line: block.end_line,
            col: block.end_col,
        };
        // Blocks are sorted by start, so everything from here on is past the
        // end of the declaration.
        if block_start >= declaration.end {
            break;
        }
        if block_end <= declaration.start {
            continue;
        }
        // Every physical line of an overlapping block gets its own entry;
        // a line under two blocks keeps both entries.
        for number in block.start_line..=block.end_line {
            method.lines.push(Line {
                number,
                hits: block.count,
            });
        }
    }
    method.line_rate = hit_rate(&method.lines);
    method
}
