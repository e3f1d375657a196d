use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::BytesText;

use crate::cobertura::{Class, Coverage, Line, Method, Package};

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const DOCTYPE: &str =
    "<!DOCTYPE coverage SYSTEM \"http://cobertura.sourceforge.net/xml/coverage-04.dtd\">\n";

// Branch coverage is not computed; every level reports it as fully covered.
const BRANCH_RATE: &str = "1";
const COMPLEXITY: &str = "0";

// The whole tree is rendered into one buffer; nothing reaches the output
// stream until the document is complete.
pub fn render(coverage: &Coverage) -> Result<Vec<u8>, quick_xml::Error> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(XML_HEADER.as_bytes());
    buffer.extend_from_slice(DOCTYPE.as_bytes());
    {
        let mut writer = Writer::new_with_indent(&mut buffer, b'\t', 1);
        write_coverage(&mut writer, coverage)?;
    }
    buffer.push(b'\n');
    Ok(buffer)
}

fn write_coverage<W: Write>(
    writer: &mut Writer<W>,
    coverage: &Coverage,
) -> Result<(), quick_xml::Error> {
    let line_rate = format_rate(coverage.line_rate);
    let lines_covered = coverage.lines_covered.to_string();
    let lines_valid = coverage.lines_valid.to_string();
    let timestamp = coverage.timestamp_ms.to_string();
    writer
        .create_element("coverage")
        .with_attributes([
            ("line-rate", line_rate.as_str()),
            ("branch-rate", BRANCH_RATE),
            ("lines-covered", lines_covered.as_str()),
            ("lines-valid", lines_valid.as_str()),
            ("timestamp", timestamp.as_str()),
            ("complexity", COMPLEXITY),
            ("version", ""),
        ])
        .write_inner_content(|writer| -> Result<(), quick_xml::Error> {
            write_sources(writer, &coverage.sources)?;
            write_packages(writer, &coverage.packages)
        })?;
    Ok(())
}

fn write_sources<W: Write>(
    writer: &mut Writer<W>,
    sources: &[String],
) -> Result<(), quick_xml::Error> {
    writer
        .create_element("sources")
        .write_inner_content(|writer| -> Result<(), quick_xml::Error> {
            for source in sources {
                writer
                    .create_element("source")
                    .write_text_content(BytesText::new(source))?;
            }
            Ok(())
        })?;
    Ok(())
}

fn write_packages<W: Write>(
    writer: &mut Writer<W>,
    packages: &[Package],
) -> Result<(), quick_xml::Error> {
    writer
        .create_element("packages")
        .write_inner_content(|writer| -> Result<(), quick_xml::Error> {
            for package in packages {
                write_package(writer, package)?;
            }
            Ok(())
        })?;
    Ok(())
}

fn write_package<W: Write>(
    writer: &mut Writer<W>,
    package: &Package,
) -> Result<(), quick_xml::Error> {
    let line_rate = format_rate(package.line_rate);
    writer
        .create_element("package")
        .with_attributes([
            ("name", package.name.as_str()),
            ("line-rate", line_rate.as_str()),
            ("branch-rate", BRANCH_RATE),
            ("complexity", COMPLEXITY),
        ])
        .write_inner_content(|writer| -> Result<(), quick_xml::Error> {
            writer
                .create_element("classes")
                .write_inner_content(|writer| -> Result<(), quick_xml::Error> {
                    for class in &package.classes {
                        write_class(writer, class)?;
                    }
                    Ok(())
                })?;
            Ok(())
        })?;
    Ok(())
}

fn write_class<W: Write>(writer: &mut Writer<W>, class: &Class) -> Result<(), quick_xml::Error> {
    let line_rate = format_rate(class.line_rate);
    writer
        .create_element("class")
        .with_attributes([
            ("name", class.name.as_str()),
            ("filename", class.filename.as_str()),
            ("line-rate", line_rate.as_str()),
            ("branch-rate", BRANCH_RATE),
            ("complexity", COMPLEXITY),
        ])
        .write_inner_content(|writer| -> Result<(), quick_xml::Error> {
            writer
                .create_element("methods")
                .write_inner_content(|writer| -> Result<(), quick_xml::Error> {
                    for method in &class.methods {
                        write_method(writer, method)?;
                    }
                    Ok(())
                })?;
            write_lines(writer, &class.lines)?;
            Ok(())
        })?;
    Ok(())
}

fn write_method<W: Write>(
    writer: &mut Writer<W>,
    method: &Method,
) -> Result<(), quick_xml::Error> {
    let line_rate = format_rate(method.line_rate);
    writer
        .create_element("method")
        .with_attributes([
            ("name", method.name.as_str()),
            ("line-rate", line_rate.as_str()),
            ("branch-rate", BRANCH_RATE),
        ])
        .write_inner_content(|writer| write_lines(writer, &method.lines))?;
    Ok(())
}

fn write_lines<W: Write>(writer: &mut Writer<W>, lines: &[Line]) -> Result<(), quick_xml::Error> {
    writer
        .create_element("lines")
        .write_inner_content(|writer| -> Result<(), quick_xml::Error> {
            for line in lines {
                let number = line.number.to_string();
                let hits = line.hits.to_string();
                writer
                    .create_element("line")
                    .with_attributes([("number", number.as_str()), ("hits", hits.as_str())])
                    .write_empty()?;
            }
            Ok(())
        })?;
    Ok(())
}

fn format_rate(rate: f64) -> String {
    format!("{rate}")
}
