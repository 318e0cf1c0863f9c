//! PowerPoint (PPTX) text extraction.
//!
//! Reads the Office Open XML package directly: slide order comes from
//! `ppt/_rels/presentation.xml.rels`, text from every DrawingML `<a:t>` run on
//! each slide, followed by that slide's speaker notes.
use crate::error::{LangsiftError, Result};
use roxmltree::Document;
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

const A_NAMESPACE: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

struct PptxContainer<R: Read + Seek> {
    archive: ZipArchive<R>,
    slide_paths: Vec<String>,
}

impl<R: Read + Seek> PptxContainer<R> {
    fn new(reader: R) -> Result<Self> {
        let mut archive = match ZipArchive::new(reader) {
            Ok(arc) => arc,
            Err(zip::result::ZipError::Io(io_err)) => return Err(io_err.into()), // Bubble up IO errors ~keep
            Err(e) => {
                return Err(LangsiftError::parsing(format!(
                    "Failed to read PPTX archive (invalid format): {}",
                    e
                )));
            }
        };

        let slide_paths = Self::find_slide_paths(&mut archive)?;

        Ok(Self { archive, slide_paths })
    }

    fn read_file(&mut self, path: &str) -> Result<Vec<u8>> {
        read_file_from_archive(&mut self.archive, path)
    }

    fn find_slide_paths(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        if let Ok(rels_data) = read_file_from_archive(archive, "ppt/_rels/presentation.xml.rels")
            && let Ok(paths) = parse_presentation_rels(&rels_data)
            && !paths.is_empty()
        {
            return Ok(paths);
        }

        let mut slide_paths: Vec<String> = archive
            .file_names()
            .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
            .map(str::to_string)
            .collect();

        slide_paths.sort_by_key(|path| slide_number(path));
        Ok(slide_paths)
    }
}

fn read_file_from_archive<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Vec<u8>> {
    let mut file = match archive.by_name(path) {
        Ok(f) => f,
        Err(zip::result::ZipError::Io(io_err)) => return Err(io_err.into()), // Bubble up IO errors ~keep
        Err(e) => {
            return Err(LangsiftError::parsing(format!(
                "Failed to read '{}' from archive: {}",
                path, e
            )));
        }
    };
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

/// Numeric suffix of `ppt/slides/slideN.xml`, so slide10 sorts after slide9.
fn slide_number(path: &str) -> u32 {
    path.rsplit('/')
        .next()
        .and_then(|name| name.strip_prefix("slide"))
        .and_then(|name| name.strip_suffix(".xml"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(u32::MAX)
}

fn parse_presentation_rels(rels_data: &[u8]) -> Result<Vec<String>> {
    let xml_str = std::str::from_utf8(rels_data)
        .map_err(|e| LangsiftError::parsing(format!("Invalid UTF-8 in presentation rels: {}", e)))?;

    let doc = Document::parse(xml_str)
        .map_err(|e| LangsiftError::parsing(format!("Failed to parse presentation rels: {}", e)))?;

    let mut slide_paths = Vec::new();

    for node in doc.descendants() {
        if node.has_tag_name("Relationship")
            && let Some(rel_type) = node.attribute("Type")
            && rel_type.ends_with("/slide")
            && let Some(target) = node.attribute("Target")
        {
            let normalized_target = target.strip_prefix('/').unwrap_or(target);
            let final_path = if normalized_target.starts_with("ppt/") {
                normalized_target.to_string()
            } else {
                format!("ppt/{}", normalized_target)
            };
            slide_paths.push(final_path);
        }
    }

    Ok(slide_paths)
}

/// Collect every DrawingML text run in `xml_data`, one paragraph per line.
fn extract_drawing_text(xml_data: &[u8]) -> Result<String> {
    let xml_str =
        std::str::from_utf8(xml_data).map_err(|e| LangsiftError::parsing(format!("Invalid UTF-8 in slide XML: {}", e)))?;

    let doc =
        Document::parse(xml_str).map_err(|e| LangsiftError::parsing(format!("Failed to parse slide XML: {}", e)))?;

    let mut lines = Vec::new();
    for paragraph in doc.descendants().filter(|n| n.has_tag_name((A_NAMESPACE, "p"))) {
        let line: String = paragraph
            .descendants()
            .filter(|n| n.has_tag_name((A_NAMESPACE, "t")))
            .filter_map(|n| n.text())
            .collect();
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }

    Ok(lines.join("\n"))
}

fn notes_path_for(slide_path: &str) -> String {
    slide_path.replace("slides/slide", "notesSlides/notesSlide")
}

/// Extract slide and speaker-note text from PPTX bytes.
pub fn extract_text(data: &[u8]) -> Result<String> {
    let mut container = PptxContainer::new(Cursor::new(data))?;
    let slide_paths = container.slide_paths.clone();

    let mut sections = Vec::with_capacity(slide_paths.len());
    for slide_path in &slide_paths {
        let xml = container.read_file(slide_path)?;
        let slide_text = extract_drawing_text(&xml)?;
        if !slide_text.is_empty() {
            sections.push(slide_text);
        }

        if let Ok(notes_xml) = container.read_file(&notes_path_for(slide_path))
            && let Ok(notes) = extract_drawing_text(&notes_xml)
            && !notes.is_empty()
        {
            sections.push(notes);
        }
    }

    tracing::trace!(slides = slide_paths.len(), "Extracted PPTX text");
    Ok(sections.join("\n\n"))
}
