//! XML bodies for the parts of a PresentationML package.
//!
//! Only the parts a minimal deck needs are produced: one master, one theme,
//! a title layout and a blank layout.

use std::fmt::Write;

use super::units::{Canvas, Emu, Placement};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

const REL_OFFICE_DOC: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE_PROPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_APP_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
pub(crate) const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub(crate) const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub(crate) const REL_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub(crate) const REL_THEME: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
pub(crate) const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub(crate) const REL_PRES_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";
pub(crate) const REL_VIEW_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/viewProps";
pub(crate) const REL_TABLE_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/tableStyles";

/// Escape text for element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Control characters other than tab/newline are not allowed in XML 1.0.
            c if (c as u32) < 0x20 && c != '\t' && c != '\n' && c != '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// A single `<Relationship>` entry.
pub struct Relationship<'a> {
    pub id: String,
    pub rel_type: &'a str,
    pub target: String,
}

pub fn relationships(rels: &[Relationship<'_>]) -> String {
    let mut xml = format!(
        r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#
    );
    for rel in rels {
        let _ = write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            rel.id,
            rel.rel_type,
            escape(&rel.target)
        );
    }
    xml.push_str("</Relationships>");
    xml
}

pub fn package_relationships() -> String {
    relationships(&[
        Relationship {
            id: "rId1".into(),
            rel_type: REL_OFFICE_DOC,
            target: "ppt/presentation.xml".into(),
        },
        Relationship {
            id: "rId2".into(),
            rel_type: REL_CORE_PROPS,
            target: "docProps/core.xml".into(),
        },
        Relationship {
            id: "rId3".into(),
            rel_type: REL_APP_PROPS,
            target: "docProps/app.xml".into(),
        },
    ])
}

pub fn content_types(slide_count: usize) -> String {
    let mut xml = format!(
        r#"{XML_DECL}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#
    );
    xml.push_str(
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    );
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#);

    let overrides = [
        (
            "/ppt/presentation.xml",
            "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml",
        ),
        (
            "/ppt/slideMasters/slideMaster1.xml",
            "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml",
        ),
        (
            "/ppt/slideLayouts/slideLayout1.xml",
            "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml",
        ),
        (
            "/ppt/slideLayouts/slideLayout2.xml",
            "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml",
        ),
        ("/ppt/theme/theme1.xml", "application/vnd.openxmlformats-officedocument.theme+xml"),
        (
            "/ppt/presProps.xml",
            "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml",
        ),
        (
            "/ppt/viewProps.xml",
            "application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml",
        ),
        (
            "/ppt/tableStyles.xml",
            "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml",
        ),
        ("/docProps/core.xml", "application/vnd.openxmlformats-package.core-properties+xml"),
        (
            "/docProps/app.xml",
            "application/vnd.openxmlformats-officedocument.extended-properties+xml",
        ),
    ];
    for (part, content_type) in overrides {
        let _ = write!(xml, r#"<Override PartName="{part}" ContentType="{content_type}"/>"#);
    }
    for n in 1..=slide_count {
        let _ = write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
        );
    }
    xml.push_str("</Types>");
    xml
}

/// `created` must already be W3CDTF.
pub fn core_properties(title: &str, created: &str) -> String {
    format!(
        concat!(
            r#"{decl}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            r#"<dc:title>{title}</dc:title><dc:creator>{title}</dc:creator>"#,
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{created}</dcterms:created>"#,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{created}</dcterms:modified>"#,
            r#"</cp:coreProperties>"#,
        ),
        decl = XML_DECL,
        title = escape(title),
        created = escape(created),
    )
}

pub fn app_properties(slide_count: usize) -> String {
    format!(
        concat!(
            r#"{decl}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
            r#"<Application>{app}</Application><Slides>{slides}</Slides>"#,
            r#"</Properties>"#,
        ),
        decl = XML_DECL,
        app = env!("CARGO_PKG_NAME"),
        slides = slide_count,
    )
}

/// `slide_rel_ids` are the presentation-level relationship ids of each slide, in order.
pub fn presentation(canvas: Canvas, slide_rel_ids: &[String]) -> String {
    let mut xml = format!(
        r#"{XML_DECL}<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" saveSubsetFonts="1">"#
    );
    xml.push_str(
        r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
    );
    if !slide_rel_ids.is_empty() {
        xml.push_str("<p:sldIdLst>");
        for (i, rel_id) in slide_rel_ids.iter().enumerate() {
            let _ = write!(xml, r#"<p:sldId id="{}" r:id="{rel_id}"/>"#, 256 + i);
        }
        xml.push_str("</p:sldIdLst>");
    }
    let size_type = if canvas == Canvas::STANDARD {
        r#" type="screen4x3""#
    } else {
        ""
    };
    let _ = write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}"{size_type}/><p:notesSz cx="{}" cy="{}"/>"#,
        canvas.width.0, canvas.height.0, canvas.height.0, canvas.width.0
    );
    xml.push_str("</p:presentation>");
    xml
}

pub fn presentation_properties() -> String {
    format!(r#"{XML_DECL}<p:presentationPr xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"/>"#)
}

pub fn view_properties() -> String {
    format!(r#"{XML_DECL}<p:viewPr xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"/>"#)
}

pub fn table_styles() -> String {
    format!(
        r#"{XML_DECL}<a:tblStyleLst xmlns:a="{NS_A}" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#
    )
}

fn xfrm(p: Placement) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        p.x.0, p.y.0, p.w.0, p.h.0
    )
}

/// Scale a rectangle given as fractions of the canvas.
fn fraction_of(canvas: Canvas, x: f64, y: f64, w: f64, h: f64) -> Placement {
    let sx = |f: f64| Emu((canvas.width.0 as f64 * f).round() as i64);
    let sy = |f: f64| Emu((canvas.height.0 as f64 * f).round() as i64);
    Placement {
        x: sx(x),
        y: sy(y),
        w: sx(w),
        h: sy(h),
    }
}

fn title_area(canvas: Canvas) -> Placement {
    fraction_of(canvas, 0.075, 0.3106, 0.85, 0.2143)
}

fn subtitle_area(canvas: Canvas) -> Placement {
    fraction_of(canvas, 0.15, 0.5667, 0.7, 0.2556)
}

const GROUP_PROPS: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
);

const MASTER_CLR_MAPPING: &str = r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#;

/// A placeholder shape. `paragraphs` empty means an empty text body.
fn placeholder(
    id: u32,
    name: &str,
    ph: &str,
    area: Option<Placement>,
    paragraphs: &[&str],
) -> String {
    let sp_pr = match area {
        Some(p) => format!("<p:spPr>{}</p:spPr>", xfrm(p)),
        None => "<p:spPr/>".to_string(),
    };
    let mut body = String::from("<p:txBody><a:bodyPr/><a:lstStyle/>");
    if paragraphs.is_empty() {
        body.push_str("<a:p/>");
    }
    for text in paragraphs {
        let _ = write!(
            body,
            r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
            escape(text)
        );
    }
    body.push_str("</p:txBody>");
    format!(
        concat!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/>"#,
            r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{ph}</p:nvPr></p:nvSpPr>"#,
            r#"{sp_pr}{body}</p:sp>"#,
        ),
        id = id,
        name = name,
        ph = ph,
        sp_pr = sp_pr,
        body = body,
    )
}

pub fn slide_master(canvas: Canvas) -> String {
    let title = placeholder(
        2,
        "Title Placeholder 1",
        r#"<p:ph type="title"/>"#,
        Some(title_area(canvas)),
        &[],
    );
    let body = placeholder(
        3,
        "Text Placeholder 2",
        r#"<p:ph type="body" idx="1"/>"#,
        Some(subtitle_area(canvas)),
        &[],
    );
    format!(
        concat!(
            r#"{decl}<p:sldMaster xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">"#,
            r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
            r#"<p:spTree>{group}{title}{body}</p:spTree></p:cSld>"#,
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
            r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/>"#,
            r#"<p:sldLayoutId id="2147483650" r:id="rId2"/></p:sldLayoutIdLst>"#,
            r#"<p:txStyles>"#,
            r#"<p:titleStyle><a:lvl1pPr algn="ctr"><a:defRPr sz="4400"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill>"#,
            r#"<a:latin typeface="+mj-lt"/><a:ea typeface="+mj-ea"/><a:cs typeface="+mj-cs"/></a:defRPr></a:lvl1pPr></p:titleStyle>"#,
            r#"<p:bodyStyle><a:lvl1pPr algn="ctr"><a:defRPr sz="2000"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill>"#,
            r#"<a:latin typeface="+mn-lt"/><a:ea typeface="+mn-ea"/><a:cs typeface="+mn-cs"/></a:defRPr></a:lvl1pPr></p:bodyStyle>"#,
            r#"<p:otherStyle><a:lvl1pPr><a:defRPr sz="1800"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill>"#,
            r#"<a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr></p:otherStyle>"#,
            r#"</p:txStyles></p:sldMaster>"#,
        ),
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        group = GROUP_PROPS,
        title = title,
        body = body,
    )
}

/// Layout with a centered title and a subtitle placeholder.
pub fn title_layout(canvas: Canvas) -> String {
    let title = placeholder(
        2,
        "Title 1",
        r#"<p:ph type="ctrTitle"/>"#,
        Some(title_area(canvas)),
        &[],
    );
    let subtitle = placeholder(
        3,
        "Subtitle 2",
        r#"<p:ph type="subTitle" idx="1"/>"#,
        Some(subtitle_area(canvas)),
        &[],
    );
    format!(
        concat!(
            r#"{decl}<p:sldLayout xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}" type="title" preserve="1">"#,
            r#"<p:cSld name="Title Slide"><p:spTree>{group}{title}{subtitle}</p:spTree></p:cSld>"#,
            r#"{clr}</p:sldLayout>"#,
        ),
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        group = GROUP_PROPS,
        title = title,
        subtitle = subtitle,
        clr = MASTER_CLR_MAPPING,
    )
}

/// Layout with no placeholders.
pub fn blank_layout() -> String {
    format!(
        concat!(
            r#"{decl}<p:sldLayout xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}" type="blank" preserve="1">"#,
            r#"<p:cSld name="Blank"><p:spTree>{group}</p:spTree></p:cSld>{clr}</p:sldLayout>"#,
        ),
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        group = GROUP_PROPS,
        clr = MASTER_CLR_MAPPING,
    )
}

pub fn title_slide(title: &str, subtitle_lines: &[&str]) -> String {
    let title = placeholder(2, "Title 1", r#"<p:ph type="ctrTitle"/>"#, None, &[title]);
    let subtitle = placeholder(
        3,
        "Subtitle 2",
        r#"<p:ph type="subTitle" idx="1"/>"#,
        None,
        subtitle_lines,
    );
    slide(&format!("{title}{subtitle}"))
}

/// A slide holding one stretched picture. `descr` is the alt text.
pub fn picture_slide(placement: Placement, image_rel_id: &str, descr: &str) -> String {
    let pic = format!(
        concat!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="2" name="Picture 1" descr="{descr}"/>"#,
            r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
            r#"<p:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
            r#"<p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        ),
        descr = escape(descr),
        rel = image_rel_id,
        xfrm = xfrm(placement),
    );
    slide(&pic)
}

fn slide(shapes: &str) -> String {
    format!(
        concat!(
            r#"{decl}<p:sld xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">"#,
            r#"<p:cSld><p:spTree>{group}{shapes}</p:spTree></p:cSld>{clr}</p:sld>"#,
        ),
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        group = GROUP_PROPS,
        shapes = shapes,
        clr = MASTER_CLR_MAPPING,
    )
}

pub fn theme() -> String {
    let fill = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let line = |w: u32| {
        format!(
            r#"<a:ln w="{w}" cap="flat" cmpd="sng" algn="ctr"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:prstDash val="solid"/></a:ln>"#
        )
    };
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";
    format!(
        concat!(
            r#"{decl}<a:theme xmlns:a="{a}" name="Office Theme"><a:themeElements>"#,
            r#"<a:clrScheme name="Office">"#,
            r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
            r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
            r#"<a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2>"#,
            r#"<a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2>"#,
            r#"<a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4>"#,
            r#"<a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6>"#,
            r#"<a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink>"#,
            r#"</a:clrScheme>"#,
            r#"<a:fontScheme name="Office">"#,
            r#"<a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
            r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
            r#"</a:fontScheme>"#,
            r#"<a:fmtScheme name="Office">"#,
            r#"<a:fillStyleLst>{fill}{fill}{fill}</a:fillStyleLst>"#,
            r#"<a:lnStyleLst>{ln1}{ln2}{ln3}</a:lnStyleLst>"#,
            r#"<a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst>"#,
            r#"<a:bgFillStyleLst>{fill}{fill}{fill}</a:bgFillStyleLst>"#,
            r#"</a:fmtScheme></a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#,
        ),
        decl = XML_DECL,
        a = NS_A,
        fill = fill,
        ln1 = line(9525),
        ln2 = line(25400),
        ln3 = line(38100),
        effect = effect,
    )
}
