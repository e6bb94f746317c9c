//! Builds small resume PDFs in memory with lopdf.

#![allow(dead_code)]

use std::io::Write;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use tempfile::NamedTempFile;

/// One line of text: font name, size, content.
struct Line {
    font: String,
    size: f32,
    text: String,
}

/// Lines and image count of one page.
#[derive(Default)]
struct PageSpec {
    lines: Vec<Line>,
    images: usize,
}

/// Builder for a small resume PDF, one page unless [`ResumePdf::page`] is called.
pub struct ResumePdf {
    pages: Vec<PageSpec>,
    raw_content: Option<Vec<u8>>,
    target_size: Option<usize>,
}

impl Default for ResumePdf {
    fn default() -> Self {
        Self {
            pages: vec![PageSpec::default()],
            raw_content: None,
            target_size: None,
        }
    }
}

impl ResumePdf {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&mut self) -> &mut PageSpec {
        self.pages.last_mut().unwrap()
    }

    /// Add a text line drawn with a Type1 font of the given base name.
    pub fn line(mut self, font: &str, size: f32, text: &str) -> Self {
        self.current().lines.push(Line {
            font: font.to_string(),
            size,
            text: text.to_string(),
        });
        self
    }

    /// Place one more 1x1 image XObject on the current page.
    pub fn image(mut self) -> Self {
        self.current().images += 1;
        self
    }

    /// Start a new page; later lines and images land on it.
    pub fn page(mut self) -> Self {
        self.pages.push(PageSpec::default());
        self
    }

    /// Replace the first page's generated content stream with raw bytes.
    pub fn raw_content(mut self, content: &[u8]) -> Self {
        self.raw_content = Some(content.to_vec());
        self
    }

    /// Pad the file with an unreferenced stream to roughly this many bytes.
    pub fn padded_to(mut self, bytes: usize) -> Self {
        self.target_size = Some(bytes);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let unpadded = self.build_with_padding(0);
        match self.target_size {
            Some(target) if target > unpadded.len() + 64 => {
                // The padding stream adds its bytes plus a small object header.
                let padding = target - unpadded.len() - 64;
                self.build_with_padding(padding)
            }
            _ => unpadded,
        }
    }

    /// Write the PDF to a temp file with the given extension (".pdf", ".docx").
    pub fn write(&self, extension: &str) -> NamedTempFile {
        write_bytes(&self.build(), extension)
    }

    fn build_with_padding(&self, padding: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut font_names: Vec<&str> = Vec::new();
        for line in self.pages.iter().flat_map(|p| p.lines.iter()) {
            if !font_names.contains(&line.font.as_str()) {
                font_names.push(&line.font);
            }
        }

        let mut fonts = Dictionary::new();
        for (i, name) in font_names.iter().enumerate() {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => Object::Name(name.as_bytes().to_vec()),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(format!("F{}", i + 1), font_id);
        }

        // Images are numbered across the document so every page can share one
        // resource dictionary.
        let total_images: usize = self.pages.iter().map(|p| p.images).sum();
        let mut xobjects = Dictionary::new();
        for i in 0..total_images {
            let image = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 1,
                    "Height" => 1,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                vec![0x80],
            );
            let image_id = doc.add_object(image);
            xobjects.set(format!("Im{}", i + 1), image_id);
        }

        let resources_id = doc.add_object(dictionary! {
            "Font" => fonts,
            "XObject" => xobjects,
        });

        let mut kids: Vec<Object> = Vec::new();
        let mut first_image = 0;
        for (n, spec) in self.pages.iter().enumerate() {
            let content = match (&self.raw_content, n) {
                (Some(raw), 0) => raw.clone(),
                _ => page_content(spec, &font_names, first_image),
            };
            first_image += spec.images;
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if padding > 0 {
            doc.add_object(Stream::new(dictionary! {}, vec![b'0'; padding]));
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}

/// Content stream of one page; its images start at `Im{first_image + 1}`.
fn page_content(spec: &PageSpec, font_names: &[&str], first_image: usize) -> Vec<u8> {
    let mut operations = Vec::new();
    let mut y = 740.0f32;

    for line in &spec.lines {
        let index = font_names
            .iter()
            .position(|f| *f == line.font)
            .unwrap_or(0);
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![
                Object::Name(format!("F{}", index + 1).into_bytes()),
                line.size.into(),
            ],
        ));
        operations.push(Operation::new(
            "Tm",
            vec![
                1.into(),
                0.into(),
                0.into(),
                1.into(),
                72.into(),
                y.into(),
            ],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(line.text.as_str())],
        ));
        operations.push(Operation::new("ET", vec![]));
        y -= 20.0;
    }

    for i in 0..spec.images {
        operations.push(Operation::new("q", vec![]));
        operations.push(Operation::new(
            "cm",
            vec![
                40.into(),
                0.into(),
                0.into(),
                40.into(),
                (400 + 50 * i as i64).into(),
                700.into(),
            ],
        ));
        operations.push(Operation::new(
            "Do",
            vec![Object::Name(format!("Im{}", first_image + i + 1).into_bytes())],
        ));
        operations.push(Operation::new("Q", vec![]));
    }

    Content { operations }.encode().unwrap()
}

/// Write arbitrary bytes to a temp file with the given extension.
pub fn write_bytes(bytes: &[u8], extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("resume")
        .suffix(extension)
        .tempfile()
        .unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

/// The one-page resume of the reference scenario, in a given font and size.
pub fn reference_resume(font: &str, size: f32) -> ResumePdf {
    ResumePdf::new()
        .line(font, size, "Jane Doe")
        .line(font, size, "Software Engineer, Jan 2023 - Present")
        .line(font, size, "Built a Rust service that scores resumes")
        .image()
        .padded_to(512 * 1024)
}
