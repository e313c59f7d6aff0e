//! IIIF Presentation 3 model
//!
//! Only the parts of a manifest the viewer reads are modelled: canvases,
//! their painting and supplementing annotations, and labels. Unknown fields
//! are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CueError;

pub const MOTIVATION_PAINTING: &str = "painting";
pub const MOTIVATION_SUPPLEMENTING: &str = "supplementing";

/// A language map, e.g. `{"en": ["Interview"], "none": ["1987"]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InternationalString(pub BTreeMap<String, Vec<String>>);

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub id: String,
    #[serde(default)]
    pub label: InternationalString,
    #[serde(default)]
    pub items: Vec<Canvas>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Canvas {
    pub id: String,
    #[serde(default)]
    pub label: InternationalString,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub items: Vec<AnnotationPage>,
    #[serde(default)]
    pub annotations: Vec<AnnotationPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnotationPage {
    #[serde(default)]
    pub items: Vec<Annotation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Annotation {
    #[serde(default, deserialize_with = "one_or_many")]
    pub motivation: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub body: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: ResourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<InternationalString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum ResourceKind {
    Image,
    Audio,
    Video,
    #[default]
    Unknown,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Image => "Image",
            ResourceKind::Audio => "Sound",
            ResourceKind::Video => "Video",
            ResourceKind::Unknown => "Unknown",
        }
    }

    /// Audio and video play over time and can carry cue tracks.
    pub fn is_time_based(&self) -> bool {
        matches!(self, ResourceKind::Audio | ResourceKind::Video)
    }
}

impl From<String> for ResourceKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "Image" => ResourceKind::Image,
            // Presentation 3 says "Sound"; older manifests say "Audio".
            "Sound" | "Audio" => ResourceKind::Audio,
            "Video" => ResourceKind::Video,
            _ => ResourceKind::Unknown,
        }
    }
}

impl From<ResourceKind> for &'static str {
    fn from(kind: ResourceKind) -> Self {
        kind.as_str()
    }
}

impl Resource {
    pub fn has_format(&self, format: &str) -> bool {
        self.format.as_deref().map_or(false, |f| {
            f.split(';')
                .next()
                .map_or(false, |essence| essence.trim().eq_ignore_ascii_case(format))
        })
    }
}

impl Annotation {
    pub fn has_motivation(&self, motivation: &str) -> bool {
        self.motivation.iter().any(|m| m == motivation)
    }
}

impl Manifest {
    pub fn from_json(data: &str) -> Result<Manifest, CueError> {
        Ok(serde_json::from_str(data)?)
    }
}

/// Lookups over a store of canvases.
pub trait Vault {
    fn canvases(&self) -> &[Canvas];

    fn canvas(&self, canvas_id: &str) -> Option<&Canvas> {
        self.canvases().iter().find(|c| c.id == canvas_id)
    }

    /// The first painting body of the canvas.
    fn painting_resource(&self, canvas_id: &str) -> Option<&Resource> {
        self.canvas(canvas_id)?
            .items
            .iter()
            .flat_map(|page| page.items.iter())
            .filter(|anno| anno.has_motivation(MOTIVATION_PAINTING))
            .flat_map(|anno| anno.body.iter())
            .next()
    }

    /// Supplementing bodies of the given media type, in manifest order.
    /// Bodies without an `id` cannot be fetched and are skipped.
    fn supplementing_resources(&self, canvas_id: &str, format: &str) -> Vec<&Resource> {
        let canvas = match self.canvas(canvas_id) {
            Some(canvas) => canvas,
            None => return Vec::new(),
        };
        canvas
            .annotations
            .iter()
            .chain(canvas.items.iter())
            .flat_map(|page| page.items.iter())
            .filter(|anno| anno.has_motivation(MOTIVATION_SUPPLEMENTING))
            .flat_map(|anno| anno.body.iter())
            .filter(|res| !res.id.is_empty() && res.has_format(format))
            .collect()
    }
}

impl Vault for Manifest {
    fn canvases(&self) -> &[Canvas] {
        &self.items
    }
}

/// Resolves a language map to display text. Falls back to the `none` entry,
/// then to whichever language sorts first.
pub fn get_label(label: &InternationalString, language: &str) -> String {
    label
        .0
        .get(language)
        .or_else(|| label.0.get("none"))
        .or_else(|| label.0.values().next())
        .map(|values| values.join(" "))
        .unwrap_or_default()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(values) => values,
        OneOrMany::One(value) => vec![value],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "@context": "http://iiif.io/api/presentation/3/context.json",
        "id": "https://example.org/manifest.json",
        "type": "Manifest",
        "label": { "en": ["Oral history"] },
        "items": [
            {
                "id": "https://example.org/canvas/1",
                "type": "Canvas",
                "label": { "none": ["Side A"] },
                "duration": 4.0,
                "items": [{
                    "type": "AnnotationPage",
                    "items": [{
                        "type": "Annotation",
                        "motivation": "painting",
                        "body": {
                            "id": "https://example.org/a.mp3",
                            "type": "Sound",
                            "format": "audio/mpeg",
                            "duration": 4.0
                        },
                        "target": "https://example.org/canvas/1"
                    }]
                }],
                "annotations": [{
                    "type": "AnnotationPage",
                    "items": [
                        {
                            "type": "Annotation",
                            "motivation": "supplementing",
                            "body": { "type": "Text", "format": "text/vtt" }
                        },
                        {
                            "type": "Annotation",
                            "motivation": ["supplementing"],
                            "body": [{
                                "id": "https://example.org/a.en.vtt",
                                "type": "Text",
                                "format": "text/vtt; charset=utf-8"
                            }]
                        },
                        {
                            "type": "Annotation",
                            "motivation": "supplementing",
                            "body": {
                                "id": "https://example.org/a.pdf",
                                "type": "Text",
                                "format": "application/pdf"
                            }
                        },
                        {
                            "type": "Annotation",
                            "motivation": "commenting",
                            "body": {
                                "id": "https://example.org/b.vtt",
                                "type": "Text",
                                "format": "text/vtt"
                            }
                        }
                    ]
                }]
            },
            {
                "id": "https://example.org/canvas/2",
                "type": "Canvas",
                "items": [{
                    "type": "AnnotationPage",
                    "items": [{
                        "type": "Annotation",
                        "motivation": "painting",
                        "body": {
                            "id": "https://example.org/page.jpg",
                            "type": "Image",
                            "format": "image/jpeg",
                            "width": 1200,
                            "height": 800
                        }
                    }]
                }]
            }
        ]
    }"#;

    #[test]
    fn resolves_painting_resources() {
        let manifest = Manifest::from_json(MANIFEST).unwrap();

        let audio = manifest
            .painting_resource("https://example.org/canvas/1")
            .unwrap();
        assert_eq!(audio.kind, ResourceKind::Audio);
        assert!(audio.kind.is_time_based());

        let image = manifest
            .painting_resource("https://example.org/canvas/2")
            .unwrap();
        assert_eq!(image.kind, ResourceKind::Image);
        assert_eq!(image.width, Some(1200));
        assert!(!image.kind.is_time_based());

        assert!(manifest.painting_resource("https://example.org/canvas/9").is_none());
    }

    #[test]
    fn resolves_supplementing_resources_by_format() {
        let manifest = Manifest::from_json(MANIFEST).unwrap();

        let tracks = manifest.supplementing_resources("https://example.org/canvas/1", "text/vtt");
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "https://example.org/a.en.vtt");
        assert!(tracks.iter().all(|res| !res.id.is_empty()));

        assert!(manifest
            .supplementing_resources("https://example.org/canvas/2", "text/vtt")
            .is_empty());
        assert!(manifest
            .supplementing_resources("https://example.org/canvas/9", "text/vtt")
            .is_empty());
    }

    macro_rules! test_kind {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;

                assert_eq!(ResourceKind::from(input.to_string()), expected);
            }
        )*
        }
    }

    test_kind! {
        test_kind_image: ("Image", ResourceKind::Image),
        test_kind_sound: ("Sound", ResourceKind::Audio),
        test_kind_audio: ("Audio", ResourceKind::Audio),
        test_kind_video: ("Video", ResourceKind::Video),
        test_kind_text: ("Text", ResourceKind::Unknown),
        test_kind_lowercase: ("video", ResourceKind::Unknown),
    }

    #[test]
    fn label_prefers_requested_language() {
        let mut map = BTreeMap::new();
        map.insert("de".to_string(), vec!["Gespräch".to_string()]);
        map.insert("en".to_string(), vec!["Interview".to_string()]);
        let label = InternationalString(map);

        assert_eq!(get_label(&label, "en"), "Interview");
        assert_eq!(get_label(&label, "fr"), "Gespräch");
    }

    #[test]
    fn label_falls_back_to_none() {
        let mut map = BTreeMap::new();
        map.insert("de".to_string(), vec!["Gespräch".to_string()]);
        map.insert("none".to_string(), vec!["1987".to_string(), "Tape 2".to_string()]);
        let label = InternationalString(map);

        assert_eq!(get_label(&label, "en"), "1987 Tape 2");
        assert_eq!(get_label(&InternationalString::default(), "en"), "");
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            Manifest::from_json("{\"items\": []}"),
            Err(CueError::Manifest(_))
        ));
    }
}
