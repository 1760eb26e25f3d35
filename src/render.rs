use serde::Serialize;

use crate::domain::{Lang, Locale, ResolvedEntry, UniverseId};
use crate::error::ShowcaseError;
use crate::format::format_count;
use crate::localize::{Label, LabelKey, Localize};
use crate::merge::{MergeOutcome, RenderModel};

pub const LOADING_NAME: &str = "Loading...";
pub const NO_VALUE: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    Placeholder,
    Resolved,
    Failed,
}

impl RunPhase {
    pub fn label(self) -> &'static str {
        match self {
            RunPhase::Placeholder => "placeholder",
            RunPhase::Resolved => "resolved",
            RunPhase::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Thumbnail {
    Image { url: String },
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardLabels {
    pub owner: Label,
    pub designer: Label,
    pub visits: Label,
    pub open_game: Label,
}

impl Default for CardLabels {
    fn default() -> Self {
        Self {
            owner: Label::new(LabelKey::Owner),
            designer: Label::new(LabelKey::Designer),
            visits: Label::new(LabelKey::Visits),
            open_game: Label::new(LabelKey::OpenGame),
        }
    }
}

impl Localize for CardLabels {
    fn apply_language(&mut self, lang: Lang) {
        for label in [
            &mut self.owner,
            &mut self.designer,
            &mut self.visits,
            &mut self.open_game,
        ] {
            label.apply_language(lang);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub identifier: Option<UniverseId>,
    pub name: String,
    pub reference_url: String,
    pub owner: String,
    pub designer: String,
    pub visits: String,
    pub thumbnail: Thumbnail,
    pub resolved: bool,
    pub labels: CardLabels,
}

impl Card {
    pub fn placeholder(entry: &ResolvedEntry) -> Self {
        Self {
            identifier: entry.identifier.clone(),
            name: LOADING_NAME.to_string(),
            reference_url: entry.entry.reference_url.clone(),
            owner: entry.entry.owner.clone(),
            designer: entry.entry.designer.clone(),
            visits: NO_VALUE.to_string(),
            thumbnail: Thumbnail::Placeholder,
            resolved: false,
            labels: CardLabels::default(),
        }
    }

    pub fn resolved(model: &RenderModel) -> Self {
        Self {
            identifier: Some(model.identifier.clone()),
            name: model.display_name.clone(),
            reference_url: model.reference_url.clone(),
            owner: model.owner.clone(),
            designer: model.designer.clone(),
            visits: model.visit_count_formatted.clone(),
            thumbnail: match &model.image_url {
                Some(url) => Thumbnail::Image { url: url.clone() },
                None => Thumbnail::Placeholder,
            },
            resolved: true,
            labels: CardLabels::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "text", rename_all = "lowercase")]
pub enum TotalDisplay {
    Pending,
    Value(String),
    Unavailable,
}

impl TotalDisplay {
    pub fn text(&self) -> &str {
        match self {
            TotalDisplay::Value(text) => text,
            TotalDisplay::Pending | TotalDisplay::Unavailable => NO_VALUE,
        }
    }

    pub fn state(&self) -> &'static str {
        match self {
            TotalDisplay::Pending => "pending",
            TotalDisplay::Value(_) => "value",
            TotalDisplay::Unavailable => "unavailable",
        }
    }
}

// Placeholder moves exactly once, to Resolved or Failed.
// Placeholder moves exactly once, to Resolved or Failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogPage {
    phase: RunPhase,
    lang: Lang,
    cards: Vec<Card>,
    total: TotalDisplay,
    total_label: Label,
}

impl CatalogPage {
    pub fn placeholders(entries: &[ResolvedEntry]) -> Self {
        Self {
            phase: RunPhase::Placeholder,
            lang: Lang::En,
            cards: entries.iter().map(Card::placeholder).collect(),
            total: TotalDisplay::Pending,
            total_label: Label::new(LabelKey::TotalVisits),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn total(&self) -> &TotalDisplay {
        &self.total
    }

    pub fn total_label(&self) -> &Label {
        &self.total_label
    }

    pub fn resolve(
        &mut self,
        entries: &[ResolvedEntry],
        outcome: &MergeOutcome,
        locale: Locale,
    ) -> Result<(), ShowcaseError> {
        self.ensure_placeholder(RunPhase::Resolved)?;
        self.cards = entries
            .iter()
            .zip(&outcome.models)
            .map(|(entry, model)| match model {
                Some(model) => Card::resolved(model),
                None => Card::placeholder(entry),
            })
            .collect();
        self.total = TotalDisplay::Value(format_count(&outcome.total, locale));
        self.phase = RunPhase::Resolved;
        self.apply_language(self.lang);
        Ok(())
    }

    pub fn fail(&mut self) -> Result<(), ShowcaseError> {
        self.ensure_placeholder(RunPhase::Failed)?;
        self.total = TotalDisplay::Unavailable;
        self.phase = RunPhase::Failed;
        Ok(())
    }

    fn ensure_placeholder(&self, to: RunPhase) -> Result<(), ShowcaseError> {
        if self.phase != RunPhase::Placeholder {
            return Err(ShowcaseError::InvalidTransition {
                from: self.phase.label(),
                to: to.label(),
            });
        }
        Ok(())
    }
}

impl Localize for CatalogPage {
    fn apply_language(&mut self, lang: Lang) {
        self.lang = lang;
        self.total_label.apply_language(lang);
        for card in &mut self.cards {
            card.labels.apply_language(lang);
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use num_bigint::BigUint;

    use super::*;
    use crate::domain::CatalogEntry;

    fn entry(url: &str, id: Option<&str>) -> ResolvedEntry {
        ResolvedEntry {
            entry: CatalogEntry {
                reference_url: url.to_string(),
                owner: "Gren".to_string(),
                designer: "youssef_design".to_string(),
            },
            identifier: id.map(|v| v.parse().unwrap()),
        }
    }

    #[test]
    fn placeholders_carry_static_fields() {
        let page = CatalogPage::placeholders(&[entry("https://x/games/1/a", Some("1"))]);
        let card = &page.cards()[0];
        assert_eq!(card.name, LOADING_NAME);
        assert_eq!(card.owner, "Gren");
        assert_eq!(card.visits, NO_VALUE);
        assert_eq!(card.thumbnail, Thumbnail::Placeholder);
        assert_eq!(page.total(), &TotalDisplay::Pending);
    }

    #[test]
    fn resolved_page_cannot_fail_afterwards() {
        let entries = [entry("https://x/games/1/a", Some("1"))];
        let mut page = CatalogPage::placeholders(&entries);
        let outcome = MergeOutcome {
            models: vec![None],
            total: BigUint::default(),
        };
        page.resolve(&entries, &outcome, Locale::En).unwrap();
        assert_matches!(page.fail(), Err(ShowcaseError::InvalidTransition { .. }));
        assert_eq!(page.phase(), RunPhase::Resolved);
    }

    #[test]
    fn failed_page_keeps_placeholders() {
        let entries = [entry("https://x/games/1/a", Some("1"))];
        let mut page = CatalogPage::placeholders(&entries);
        let before = page.cards().to_vec();
        page.fail().unwrap();
        assert_eq!(page.cards(), before.as_slice());
        assert_eq!(page.total(), &TotalDisplay::Unavailable);
        assert_eq!(page.total().text(), NO_VALUE);
    }

    #[test]
    fn language_pass_reaches_every_card() {
        let entries = [
            entry("https://x/games/1/a", Some("1")),
            entry("https://x/nothing", None),
        ];
        let mut page = CatalogPage::placeholders(&entries);
        page.apply_language(Lang::Ar);
        assert_eq!(page.lang(), Lang::Ar);
        assert!(page.cards().iter().all(|card| card.labels.visits.text == "الزيارات:"));
        assert_eq!(page.total_label().text, "إجمالي الزيارات:");
    }
}
