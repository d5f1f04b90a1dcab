use std::sync::{Arc, OnceLock};

use ab_glyph::FontVec;
use usvg::fontdb::{Database, Family, ID, Query, Stretch, Style, Weight};

use crate::RenderError;

/// Families tried in order when resolving the drawing face.
const PREFERRED_FAMILIES: &[Family<'static>] = &[
    Family::Name("DejaVu Sans"),
    Family::Name("Liberation Sans"),
    Family::Name("Arial"),
    Family::Name("Helvetica"),
    Family::SansSerif,
];

/// Sans-serif faces resolved from the system font database.
///
/// The same database feeds PNG rasterization, so measured and drawn text use
/// one face.
pub struct FontHandle {
    db: Arc<Database>,
    family: String,
    pub regular: FontVec,
    pub bold: FontVec,
}

impl FontHandle {
    /// Load system fonts and resolve a regular and a bold face.
    pub fn system() -> crate::Result<Self> {
        let mut db = Database::new();
        db.load_system_fonts();
        Self::from_database(db)
    }

    /// Resolve faces from an already populated database.
    pub fn from_database(db: Database) -> crate::Result<Self> {
        let query = |weight| Query {
            families: PREFERRED_FAMILIES,
            weight,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let regular_id = db
            .query(&query(Weight::NORMAL))
            .or_else(|| db.faces().next().map(|f| f.id))
            .ok_or_else(|| RenderError::Font("no usable font found on this system".into()))?;
        let bold_id = db.query(&query(Weight::BOLD)).unwrap_or(regular_id);

        let family = db
            .face(regular_id)
            .and_then(|f| f.families.first())
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| "sans-serif".into());

        let load = |id: ID| -> crate::Result<FontVec> {
            db.with_face_data(id, |data, index| {
                FontVec::try_from_vec_and_index(data.to_vec(), index)
            })
            .ok_or_else(|| RenderError::Font(format!("cannot read face data of {family}")))?
            .map_err(|e| RenderError::Font(e.to_string()))
        };
        let regular = load(regular_id)?;
        let bold = load(bold_id)?;

        tracing::debug!(family = %family, faces = db.len(), "font resolved");
        Ok(Self { db: Arc::new(db), family, regular, bold })
    }

    /// Process-wide handle, resolved on first use.
    pub fn shared() -> crate::Result<&'static FontHandle> {
        static SHARED: OnceLock<std::result::Result<FontHandle, String>> = OnceLock::new();
        SHARED
            .get_or_init(|| {
                FontHandle::system().map_err(|e| match e {
                    RenderError::Font(msg) => msg,
                    other => other.to_string(),
                })
            })
            .as_ref()
            .map_err(|e| RenderError::Font(e.clone()))
    }

    pub fn select(&self, bold: bool) -> &FontVec {
        if bold { &self.bold } else { &self.regular }
    }

    /// Family name written into SVG `font-family`.
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn database(&self) -> Arc<Database> {
        Arc::clone(&self.db)
    }
}
