use crate::domain::Lang;
use crate::localize::{Label, translate};
use crate::render::{Card, CatalogPage, Thumbnail};

pub const CONTAINER_ID: &str = "gamesWrap";
pub const TOTAL_ID: &str = "totalVisits";

const IMAGE_FALLBACK: &str = "var d=document.createElement('div');\
d.className='game-thumb placeholder';d.setAttribute('role','img');\
d.setAttribute('aria-label',this.alt);this.replaceWith(d)";

pub fn render_document(page: &CatalogPage, title: &str) -> String {
    let lang = page.lang();
    let title = escape(title);
    let cards: String = page.cards().iter().map(render_card).collect();
    format!(
        "<!DOCTYPE html>
<html lang=\"{code}\" dir=\"{dir}\">
<head>
  <meta charset=\"utf-8\">
  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">
  <title>{title}</title>
</head>
<body>
<main class=\"games-page\">
  <h1>{title}</h1>
  <p class=\"total-visits\">{total_label} <span id=\"{TOTAL_ID}\" data-state=\"{total_state}\">{total}</span></p>
  <div id=\"{CONTAINER_ID}\" data-phase=\"{phase}\">
{cards}  </div>
</main>
</body>
</html>
",
        code = lang.code(),
        dir = lang.dir(),
        total_label = label_span("label", page.total_label()),
        total_state = page.total().state(),
        total = escape(page.total().text()),
        phase = page.phase().label(),
    )
}

pub fn render_card(card: &Card) -> String {
    let name = escape(&card.name);
    let url = escape(&card.reference_url);
    let thumb = match &card.thumbnail {
        Thumbnail::Image { url } => format!(
            "<img class=\"game-thumb\" alt=\"{name} icon\" src=\"{}\" onerror=\"{IMAGE_FALLBACK}\">",
            escape(url)
        ),
        Thumbnail::Placeholder => format!(
            "<div class=\"game-thumb placeholder\" role=\"img\" aria-label=\"{name} icon\"></div>"
        ),
    };
    let state = if card.resolved { "resolved" } else { "placeholder" };
    let id_attr = card
        .identifier
        .as_ref()
        .map(|id| format!(" data-universe-id=\"{id}\""))
        .unwrap_or_default();

    format!(
        "    <section class=\"game-card reveal\" data-state=\"{state}\"{id_attr}>
      <div class=\"thumb-side\">
        <a class=\"thumb-link\" href=\"{url}\" target=\"_blank\" rel=\"noopener noreferrer\" aria-label=\"Open {name}\">
          {thumb}
          <div class=\"thumb-overlay\"></div>
        </a>
      </div>
      <div class=\"game-body\">
        <div class=\"game-head\">
          <div class=\"game-title\"><span>{name}</span></div>
          <span class=\"game-badge\">Roblox Game</span>
        </div>
        <ul class=\"info-list\">
          <li class=\"info-row\">{owner_label} <span>{owner}</span></li>
          <li class=\"info-row\">{designer_label} <span>{designer}</span></li>
          <li class=\"info-row visits\">{visits_label} <span class=\"visits-num\">{visits}</span></li>
        </ul>
        <a class=\"open-btn\" href=\"{url}\" target=\"_blank\" rel=\"noopener noreferrer\">{open_label}</a>
      </div>
    </section>
",
        owner_label = label_span("label", &card.labels.owner),
        owner = escape(&card.owner),
        designer_label = label_span("label", &card.labels.designer),
        designer = escape(&card.designer),
        visits_label = label_span("label", &card.labels.visits),
        visits = escape(&card.visits),
        open_label = label_span("", &card.labels.open_game),
    )
}

fn label_span(class: &str, label: &Label) -> String {
    let class_attr = if class.is_empty() {
        String::new()
    } else {
        format!(" class=\"{class}\"")
    };
    let translations: String = Lang::ALL
        .iter()
        .map(|lang| {
            format!(
                " data-{}=\"{}\"",
                lang.code(),
                escape(translate(label.key, *lang))
            )
        })
        .collect();
    format!(
        "<span{class_attr}{translations}>{}</span>",
        escape(&label.text)
    )
}

pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
