use quire::{Article, ContentBlock, Section};
use serde_json::{Value, json};

/// `n` one-sentence paragraphs. A single sentence never splits.
pub fn paragraphs(n: usize) -> Vec<ContentBlock> {
    (1..=n)
        .map(|i| ContentBlock::paragraph(format!("Paragraph {}", i)))
        .collect()
}

pub fn section(id: &str, content: Vec<ContentBlock>) -> Section {
    Section {
        id: id.to_string(),
        content,
        ..Default::default()
    }
}

pub fn article(sections: Vec<Section>) -> Article {
    Article {
        title: "Field Notes".to_string(),
        sections,
        ..Default::default()
    }
}

/// A realistic article as the extraction service returns it.
pub fn extracted_article_json() -> Value {
    let body = "The river rose overnight and the ferry stayed on the far bank. \
                Villagers gathered on the levee to watch the water. \
                By noon the current had slowed and the first boats went out. ";
    json!({
        "article": {
            "title": "After the Flood",
            "date": "2026-03-02",
            "description": "A week on the lower river.",
            "profiles": [{ "name": "Ada Marsh", "role": "Reporter" }],
            "sections": [
                {
                    "id": "intro",
                    "content": [
                        { "type": "paragraph", "text": body.repeat(3) },
                        { "type": "image", "src": "https://example.com/levee.jpg", "caption": "The levee at dawn." }
                    ]
                },
                {
                    "id": "the-crossing",
                    "level": 2,
                    "heading": { "type": "heading", "level": 2, "text": "The crossing" },
                    "content": [
                        { "type": "paragraph", "text": body.repeat(6) },
                        { "type": "list", "items": ["Rope", "Lanterns", "Spare oars"], "ordered": true },
                        { "type": "quote", "text": "Nobody crosses until the water says so." },
                        { "type": "paragraph", "text": body.repeat(4) },
                        { "type": "sparkline", "points": [1, 2, 3] }
                    ],
                    "subsections": [
                        {
                            "heading": { "type": "heading", "level": 3, "text": "Night shift" },
                            "content": [{ "type": "paragraph", "text": body.repeat(2) }]
                        }
                    ]
                }
            ]
        }
    })
}
