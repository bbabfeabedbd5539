use crate::change_detector::{ChangeSet, StatusChange};
use serde::Serialize;

const CARD_TYPE: &str = "AdaptiveCard";
const CARD_SCHEMA: &str = "http://adaptivecards.io/schemas/adaptive-card.json";
const CARD_VERSION: &str = "1.4";

const SAMPLE_COUNTY: &str = "臺北市";
const SAMPLE_BEFORE: &str = "正常上班、正常上課。";
const SAMPLE_AFTER: &str = "士林區永福里、新安里、陽明里、公館里、菁山里、平等里、溪山里、翠山里:今天停止上班、停止上課。 北投區湖田里、湖山里、大屯里、泉源里:今天停止上班、停止上課。";

/// The payload the webhook expects: the card wrapped in a `message` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardEnvelope {
    pub message: AdaptiveCard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdaptiveCard {
    #[serde(rename = "type")]
    kind: &'static str,
    pub body: Vec<Element>,
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
}

impl AdaptiveCard {
    pub fn new(body: Vec<Element>) -> Self {
        Self {
            kind: CARD_TYPE,
            body,
            schema: CARD_SCHEMA,
            version: CARD_VERSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Element {
    TextBlock(TextBlock),
    Container(Container),
    FactSet(FactSet),
    ActionSet(ActionSet),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Size {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Weight {
    Bolder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Color {
    Good,
    Attention,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Spacing {
    Small,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub text: String,
    pub wrap: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Weight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<Spacing>,
    #[serde(rename = "isSubtle", skip_serializing_if = "Option::is_none")]
    pub is_subtle: Option<bool>,
}

impl TextBlock {
    /// A wrapping text block with no styling.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            wrap: true,
            size: None,
            weight: None,
            color: None,
            spacing: None,
            is_subtle: None,
        }
    }

    pub fn size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn bolder(mut self) -> Self {
        self.weight = Some(Weight::Bolder);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn subtle(mut self) -> Self {
        self.is_subtle = Some(true);
        self
    }
}

impl From<TextBlock> for Element {
    fn from(block: TextBlock) -> Self {
        Element::TextBlock(block)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Container {
    pub spacing: Spacing,
    pub separator: bool,
    pub items: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactSet {
    pub facts: Vec<Fact>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fact {
    pub title: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionSet {
    pub spacing: Spacing,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Action {
    #[serde(rename = "Action.OpenUrl")]
    OpenUrl { title: String, url: String },
}

/// Links rendered as buttons at the bottom of a change notification.
#[derive(Debug, Clone)]
pub struct CardLinks {
    pub repository_url: String,
    pub flow_url: String,
}

fn county_section(county: &str, before: &str, after: &str) -> Element {
    Element::Container(Container {
        spacing: Spacing::Medium,
        separator: true,
        items: vec![
            TextBlock::new(format!("**{county}**"))
                .bolder()
                .size(Size::Medium)
                .into(),
            Element::FactSet(FactSet {
                facts: vec![
                    Fact {
                        title: "變更前：".to_string(),
                        value: before.to_string(),
                    },
                    Fact {
                        title: "變更後：".to_string(),
                        value: after.to_string(),
                    },
                ],
            }),
        ],
    })
}

fn change_section(change: &StatusChange) -> Element {
    county_section(change.county.as_ref(), &change.before, &change.after)
}

/// One section per changed county, in the order the changes were detected.
pub fn change_notification_card(changes: &ChangeSet, links: &CardLinks) -> CardEnvelope {
    let mut body: Vec<Element> = vec![
        TextBlock::new("🌀 颱風假異動通知")
            .size(Size::Large)
            .bolder()
            .color(Color::Attention)
            .into(),
        TextBlock::new("以下縣市的颱風假狀態已更新：")
            .spacing(Spacing::Small)
            .into(),
    ];
    body.extend(changes.iter().map(change_section));
    body.push(
        TextBlock::new("📍 資料來源：行政院人事行政總處")
            .spacing(Spacing::Medium)
            .subtle()
            .size(Size::Small)
            .into(),
    );
    body.push(Element::ActionSet(ActionSet {
        spacing: Spacing::Small,
        actions: vec![
            Action::OpenUrl {
                title: "📦 GitHub Repo".to_string(),
                url: links.repository_url.clone(),
            },
            Action::OpenUrl {
                title: "⚡ Power Automate Flow".to_string(),
                url: links.flow_url.clone(),
            },
        ],
    }));

    CardEnvelope {
        message: AdaptiveCard::new(body),
    }
}

/// A fixed card with a sample Taipei change, clearly marked as a test.
pub fn test_notification_card() -> CardEnvelope {
    let body = vec![
        TextBlock::new("🧪 測試通知")
            .size(Size::Large)
            .bolder()
            .color(Color::Good)
            .into(),
        TextBlock::new("這是一則測試通知，用於驗證 Power Automate 整合是否正常運作。")
            .spacing(Spacing::Small)
            .into(),
        county_section(SAMPLE_COUNTY, SAMPLE_BEFORE, SAMPLE_AFTER),
        TextBlock::new("📍 這是測試通知，並非實際颱風假異動")
            .spacing(Spacing::Medium)
            .subtle()
            .size(Size::Small)
            .color(Color::Attention)
            .into(),
    ];

    CardEnvelope {
        message: AdaptiveCard::new(body),
    }
}
