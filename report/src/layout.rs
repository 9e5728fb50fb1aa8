//! Declarative layout tree
//!
//! A report is described as a flat list of [`Node`]s. [`paginate`] assigns
//! every section a page and a vertical offset; the PDF writer only draws what
//! it is handed. Tests inspect the tree directly instead of parsing PDF bytes.

use crate::style::{
    Color, CONTENT_BOTTOM, HEADER_HEIGHT, HEALTH_BLOCK_HEIGHT, MARGIN_TOP, TABLE_ROW_HEIGHT,
    TABLE_TITLE_HEIGHT,
};

/// A label/value row in a two-column table
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub label: String,
    pub value: String,
}

impl Row {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// One line of the nutrient table
#[derive(Debug, Clone, PartialEq)]
pub struct NutrientRow {
    pub label: String,
    pub value: String,
    pub status: String,
    pub status_color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthCard {
    pub health: String,
    pub color: Color,
    /// 0-10
    pub fertility: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CropCard {
    pub name: String,
    pub match_score: f64,
    pub fertilizer: String,
    /// At most three are drawn
    pub alternatives: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cover {
    pub title: String,
    pub subtitle: String,
    pub farmer_name: String,
    pub location: String,
    pub total_reports: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    /// Full-page title sheet, drawn at absolute positions
    Cover(Cover),
    /// Logo, report title and platform subtitles
    Header { title: String },
    Table { title: String, rows: Vec<Row> },
    Nutrients { title: String, rows: Vec<NutrientRow> },
    HealthAndCrops { health: HealthCard, crop: CropCard },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Cover,
    Header,
    Table,
    Nutrients,
    HealthAndCrops,
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        match self {
            Section::Cover(_) => SectionKind::Cover,
            Section::Header { .. } => SectionKind::Header,
            Section::Table { .. } => SectionKind::Table,
            Section::Nutrients { .. } => SectionKind::Nutrients,
            Section::HealthAndCrops { .. } => SectionKind::HealthAndCrops,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Section::Cover(c) => Some(&c.title),
            Section::Header { title }
            | Section::Table { title, .. }
            | Section::Nutrients { title, .. } => Some(title),
            Section::HealthAndCrops { .. } => None,
        }
    }

    /// Vertical space the section occupies, in points
    pub fn height(&self) -> f32 {
        match self {
            Section::Cover(_) => CONTENT_BOTTOM - MARGIN_TOP,
            Section::Header { .. } => HEADER_HEIGHT,
            Section::Table { rows, .. } => TABLE_TITLE_HEIGHT + TABLE_ROW_HEIGHT * rows.len() as f32,
            // column header band plus one band per nutrient
            Section::Nutrients { rows, .. } => {
                TABLE_TITLE_HEIGHT + TABLE_ROW_HEIGHT * (rows.len() as f32 + 1.0)
            }
            Section::HealthAndCrops { .. } => HEALTH_BLOCK_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Section(Section),
    /// Vertical whitespace; never forces a page on its own
    Gap(f32),
    /// Start a fresh page unless the current one is still empty
    PageBreak,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportLayout {
    pub nodes: Vec<Node>,
}

impl ReportLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, section: Section) -> Self {
        self.nodes.push(Node::Section(section));
        self
    }

    pub fn gap(mut self, points: f32) -> Self {
        self.nodes.push(Node::Gap(points));
        self
    }

    pub fn page_break(mut self) -> Self {
        self.nodes.push(Node::PageBreak);
        self
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Section(s) => Some(s),
            _ => None,
        })
    }

    pub fn section_kinds(&self) -> Vec<SectionKind> {
        self.sections().map(Section::kind).collect()
    }

    /// Titles of every titled section, in document order
    pub fn titles(&self) -> Vec<&str> {
        self.sections().filter_map(Section::title).collect()
    }
}

/// A section fixed to a vertical offset on its page
#[derive(Debug, Clone, PartialEq)]
pub struct Placed<'a> {
    pub section: &'a Section,
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page<'a> {
    pub sections: Vec<Placed<'a>>,
}

impl Page<'_> {
    pub fn is_cover(&self) -> bool {
        self.sections
            .first()
            .is_some_and(|p| p.section.kind() == SectionKind::Cover)
    }

    /// Lowest point drawn on the page
    pub fn bottom(&self) -> f32 {
        self.sections
            .iter()
            .map(|p| p.y + p.section.height())
            .fold(MARGIN_TOP, f32::max)
    }
}

/// Flow sections top to bottom, opening a new page whenever the next section
/// would cross the bottom margin. An oversized section gets a page to itself.
pub fn paginate(layout: &ReportLayout) -> Vec<Page<'_>> {
    let mut pages = vec![Page::default()];
    let mut y = MARGIN_TOP;

    for node in &layout.nodes {
        match node {
            Node::Gap(points) => y += points,
            Node::PageBreak => {
                if pages.last().is_some_and(|p| !p.sections.is_empty()) {
                    pages.push(Page::default());
                }
                y = MARGIN_TOP;
            }
            Node::Section(section) => {
                let height = section.height();
                let page_has_content = pages.last().is_some_and(|p| !p.sections.is_empty());
                if y + height > CONTENT_BOTTOM && page_has_content {
                    pages.push(Page::default());
                    y = MARGIN_TOP;
                }
                if let Some(page) = pages.last_mut() {
                    page.sections.push(Placed { section, y });
                }
                y += height;
            }
        }
    }

    if pages.len() > 1 && pages.last().is_some_and(|p| p.sections.is_empty()) {
        pages.pop();
    }
    pages
}

/// Footer label for a 1-based page index
pub fn page_label(index: usize, total: usize) -> String {
    format!("Page {index} of {total}")
}

/// True when every placed section sits within the printable band
pub fn fits_page(page: &Page<'_>) -> bool {
    page.is_cover() || page.sections.len() == 1 || page.bottom() <= CONTENT_BOTTOM
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: usize) -> Section {
        Section::Table {
            title: "T".into(),
            rows: (0..rows).map(|i| Row::new(format!("l{i}"), "v")).collect(),
        }
    }

    #[test]
    fn test_table_height() {
        assert_eq!(table(5).height(), 110.0);
        assert_eq!(table(0).height(), 20.0);
    }

    #[test]
    fn test_single_page_flow() {
        let layout = ReportLayout::new()
            .section(Section::Header { title: "A".into() })
            .section(table(3))
            .gap(10.0)
            .section(table(2));
        let pages = paginate(&layout);
        assert_eq!(pages.len(), 1);
        let ys: Vec<f32> = pages[0].sections.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![40.0, 105.0, 189.0]);
    }

    #[test]
    fn test_overflow_starts_new_page() {
        let mut layout = ReportLayout::new();
        for _ in 0..10 {
            layout = layout.section(table(5));
        }
        let pages = paginate(&layout);
        // 742 points of room fit six 110pt tables
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].sections.len(), 6);
        assert_eq!(pages[1].sections[0].y, MARGIN_TOP);
        assert!(pages.iter().all(fits_page));
    }

    #[test]
    fn test_page_break_on_empty_page_is_ignored() {
        let layout = ReportLayout::new()
            .page_break()
            .section(table(1))
            .page_break()
            .page_break()
            .section(table(1))
            .page_break();
        let pages = paginate(&layout);
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn test_oversized_section_gets_own_page() {
        let layout = ReportLayout::new().section(table(1)).section(table(60));
        let pages = paginate(&layout);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].sections.len(), 1);
    }

    #[test]
    fn test_empty_layout_has_one_page() {
        assert_eq!(paginate(&ReportLayout::new()).len(), 1);
    }

    #[test]
    fn test_page_label() {
        assert_eq!(page_label(2, 4), "Page 2 of 4");
    }
}
