use std::io::{Seek, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::units::{Canvas, Placement};
use super::xml::{self, Relationship};
use crate::error::DeckError;

/// Presentation-level relationships before the first slide.
const FIXED_PRESENTATION_RELS: usize = 5;

const TITLE_LAYOUT: &str = "../slideLayouts/slideLayout1.xml";
const BLANK_LAYOUT: &str = "../slideLayouts/slideLayout2.xml";

/// Streams a PresentationML package into a zip container.
///
/// Slides are written as they are added; the shared parts that depend on the
/// final slide count are written by [`PptxWriter::finish`].
pub struct PptxWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    canvas: Canvas,
    title: String,
    created: String,
    slides: usize,
    media: usize,
}

impl<W: Write + Seek> PptxWriter<W> {
    /// `created` is a W3CDTF timestamp recorded in the document properties.
    pub fn new(inner: W, canvas: Canvas, title: &str, created: &str) -> Self {
        Self {
            zip: ZipWriter::new(inner),
            canvas,
            title: title.to_string(),
            created: created.to_string(),
            slides: 0,
            media: 0,
        }
    }

    pub fn slide_count(&self) -> usize {
        self.slides
    }

    /// Append a slide using the title layout.
    pub fn add_title_slide(
        &mut self,
        title: &str,
        subtitle_lines: &[&str],
    ) -> Result<(), DeckError> {
        let body = xml::title_slide(title, subtitle_lines);
        self.push_slide(body, TITLE_LAYOUT, None)
    }

    /// Append a blank-layout slide with `jpeg` stretched over `placement`.
    pub fn add_picture_slide(
        &mut self,
        jpeg: &[u8],
        placement: Placement,
        descr: &str,
    ) -> Result<(), DeckError> {
        self.media += 1;
        let media_name = format!("image{}.jpeg", self.media);
        self.zip.start_file(format!("ppt/media/{media_name}"), stored())?;
        self.zip
            .write_all(jpeg)
            .map_err(zip::result::ZipError::Io)?;

        let body = xml::picture_slide(placement, "rId2", descr);
        self.push_slide(body, BLANK_LAYOUT, Some(format!("../media/{media_name}")))
    }

    fn push_slide(
        &mut self,
        body: String,
        layout: &str,
        image_target: Option<String>,
    ) -> Result<(), DeckError> {
        self.slides += 1;
        let n = self.slides;

        let mut rels = vec![Relationship {
            id: "rId1".into(),
            rel_type: xml::REL_SLIDE_LAYOUT,
            target: layout.into(),
        }];
        if let Some(target) = image_target {
            rels.push(Relationship {
                id: "rId2".into(),
                rel_type: xml::REL_IMAGE,
                target,
            });
        }

        self.put(&format!("ppt/slides/slide{n}.xml"), &body)?;
        self.put(&format!("ppt/slides/_rels/slide{n}.xml.rels"), &xml::relationships(&rels))?;
        debug!(slide = n, layout, "slide part written");
        Ok(())
    }

    /// Write the shared parts and close the container.
    pub fn finish(mut self) -> Result<W, DeckError> {
        let slide_rel_ids: Vec<String> = (0..self.slides)
            .map(|i| format!("rId{}", FIXED_PRESENTATION_RELS + 1 + i))
            .collect();

        self.put("[Content_Types].xml", &xml::content_types(self.slides))?;
        self.put("_rels/.rels", &xml::package_relationships())?;
        self.put(
            "docProps/core.xml",
            &xml::core_properties(&self.title, &self.created),
        )?;
        self.put("docProps/app.xml", &xml::app_properties(self.slides))?;

        self.put(
            "ppt/presentation.xml",
            &xml::presentation(self.canvas, &slide_rel_ids),
        )?;
        let mut rels = vec![
            Relationship {
                id: "rId1".into(),
                rel_type: xml::REL_SLIDE_MASTER,
                target: "slideMasters/slideMaster1.xml".into(),
            },
            Relationship {
                id: "rId2".into(),
                rel_type: xml::REL_THEME,
                target: "theme/theme1.xml".into(),
            },
            Relationship {
                id: "rId3".into(),
                rel_type: xml::REL_PRES_PROPS,
                target: "presProps.xml".into(),
            },
            Relationship {
                id: "rId4".into(),
                rel_type: xml::REL_VIEW_PROPS,
                target: "viewProps.xml".into(),
            },
            Relationship {
                id: "rId5".into(),
                rel_type: xml::REL_TABLE_STYLES,
                target: "tableStyles.xml".into(),
            },
        ];
        for (i, id) in slide_rel_ids.iter().enumerate() {
            rels.push(Relationship {
                id: id.clone(),
                rel_type: xml::REL_SLIDE,
                target: format!("slides/slide{}.xml", i + 1),
            });
        }
        self.put("ppt/_rels/presentation.xml.rels", &xml::relationships(&rels))?;
        self.put("ppt/presProps.xml", &xml::presentation_properties())?;
        self.put("ppt/viewProps.xml", &xml::view_properties())?;
        self.put("ppt/tableStyles.xml", &xml::table_styles())?;

        self.put("ppt/slideMasters/slideMaster1.xml", &xml::slide_master(self.canvas))?;
        self.put(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            &xml::relationships(&[
                Relationship {
                    id: "rId1".into(),
                    rel_type: xml::REL_SLIDE_LAYOUT,
                    target: TITLE_LAYOUT.into(),
                },
                Relationship {
                    id: "rId2".into(),
                    rel_type: xml::REL_SLIDE_LAYOUT,
                    target: BLANK_LAYOUT.into(),
                },
                Relationship {
                    id: "rId3".into(),
                    rel_type: xml::REL_THEME,
                    target: "../theme/theme1.xml".into(),
                },
            ]),
        )?;

        let layout_rels = xml::relationships(&[Relationship {
            id: "rId1".into(),
            rel_type: xml::REL_SLIDE_MASTER,
            target: "../slideMasters/slideMaster1.xml".into(),
        }]);
        self.put("ppt/slideLayouts/slideLayout1.xml", &xml::title_layout(self.canvas))?;
        self.put("ppt/slideLayouts/_rels/slideLayout1.xml.rels", &layout_rels)?;
        self.put("ppt/slideLayouts/slideLayout2.xml", &xml::blank_layout())?;
        self.put("ppt/slideLayouts/_rels/slideLayout2.xml.rels", &layout_rels)?;
        self.put("ppt/theme/theme1.xml", &xml::theme())?;

        debug!(slides = self.slides, media = self.media, "finishing deck package");
        Ok(self.zip.finish()?)
    }

    fn put(&mut self, name: &str, body: &str) -> Result<(), DeckError> {
        self.zip.start_file(name, deflated())?;
        self.zip
            .write_all(body.as_bytes())
            .map_err(zip::result::ZipError::Io)?;
        Ok(())
    }
}

fn deflated() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// JPEG data does not compress further.
fn stored() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
}
