use serde::Serialize;

use crate::domain::Lang;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKey {
    Owner,
    Designer,
    Visits,
    OpenGame,
    TotalVisits,
}

pub fn translate(key: LabelKey, lang: Lang) -> &'static str {
    match (key, lang) {
        (LabelKey::Owner, Lang::En) => "Owner:",
        (LabelKey::Owner, Lang::Ar) => "صاحب اللعبة:",
        (LabelKey::Owner, Lang::Es) => "Propietario:",
        (LabelKey::Designer, Lang::En) => "UI Designer:",
        (LabelKey::Designer, Lang::Ar) => "مصمم الواجهة:",
        (LabelKey::Designer, Lang::Es) => "Diseñador UI:",
        (LabelKey::Visits, Lang::En) => "Visits:",
        (LabelKey::Visits, Lang::Ar) => "الزيارات:",
        (LabelKey::Visits, Lang::Es) => "Visitas:",
        (LabelKey::OpenGame, Lang::En) => "Open game",
        (LabelKey::OpenGame, Lang::Ar) => "افتح اللعبة",
        (LabelKey::OpenGame, Lang::Es) => "Abrir juego",
        (LabelKey::TotalVisits, Lang::En) => "Total visits:",
        (LabelKey::TotalVisits, Lang::Ar) => "إجمالي الزيارات:",
        (LabelKey::TotalVisits, Lang::Es) => "Visitas totales:",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    pub key: LabelKey,
    pub text: String,
}

impl Label {
    pub fn new(key: LabelKey) -> Self {
        Self {
            key,
            text: translate(key, Lang::En).to_string(),
        }
    }

    pub fn localize(&mut self, lang: Lang) {
        self.text = translate(self.key, lang).to_string();
    }
}

pub trait Localize {
    fn apply_language(&mut self, lang: Lang);
}

impl Localize for Label {
    fn apply_language(&mut self, lang: Lang) {
        self.localize(lang);
    }
}
