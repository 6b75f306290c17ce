use std::{fmt, fs, path::Path};

use anyhow::{Context, Result};
use json_pretty_compact::PrettyCompactFormatter;
use log::info;
use serde::{
    de::{self, DeserializeOwned, MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::{encode::EncodedImage, palette::Palette};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trait {
    pub filename: String,
    pub data: EncodedImage,
}

/// Traits grouped by category, keeping categories in the order they were added.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Categories(Vec<(String, Vec<Trait>)>);

impl Categories {
    pub fn get(&self, category: &str) -> Option<&[Trait]> {
        self.0
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, traits)| traits.as_slice())
    }

    /// Traits of `category`, creating an empty category at the end if needed.
    pub fn entry(&mut self, category: &str) -> &mut Vec<Trait> {
        let idx = match self.0.iter().position(|(name, _)| name == category) {
            Some(idx) => idx,
            None => {
                self.0.push((category.to_string(), vec![]));
                self.0.len() - 1
            }
        };
        &mut self.0[idx].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Trait])> {
        self.0
            .iter()
            .map(|(name, traits)| (name.as_str(), traits.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Categories {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, traits) in &self.0 {
            map.serialize_entry(name, traits)?;
        }
        map.end()
    }
}

struct CategoriesVisitor;

impl<'de> Visitor<'de> for CategoriesVisitor {
    type Value = Categories;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map from category name to a list of traits")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Categories, A::Error> {
        let mut categories = Categories::default();
        while let Some((name, traits)) = access.next_entry::<String, Vec<Trait>>()? {
            if categories.get(&name).is_some() {
                return Err(de::Error::custom(format!("duplicate category {}", name)));
            }
            categories.0.push((name, traits));
        }
        Ok(categories)
    }
}

impl<'de> Deserialize<'de> for Categories {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(CategoriesVisitor)
    }
}

/// Everything needed to render a collection: the shared palette, the encoded
/// traits per category and the background colors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitCollection {
    #[serde(default)]
    pub palette: Palette,
    #[serde(default)]
    pub images: Categories,
    #[serde(default)]
    pub bgcolors: Vec<String>,
}

impl TraitCollection {
    pub fn find_trait(&self, category: &str, filename: &str) -> Option<&Trait> {
        self.images
            .get(category)?
            .iter()
            .find(|t| t.filename == filename)
    }

    /// Add traits to `category`, replacing existing ones with the same filename.
    pub fn merge_traits(&mut self, category: &str, traits: Vec<Trait>) {
        let existing = self.images.entry(category);
        for t in traits {
            match existing.iter_mut().find(|e| e.filename == t.filename) {
                Some(e) => *e = t,
                None => existing.push(t),
            }
        }
    }
}

pub fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    info!("Saving {}", path.display());
    let formatter = PrettyCompactFormatter::new();
    let mut data_bytes = vec![];
    let mut ser = serde_json::Serializer::with_formatter(&mut data_bytes, formatter);
    data.serialize(&mut ser)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &data_bytes)?;
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    info!("Loading {}", path.display());
    let data_bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let data: T = serde_json::from_slice(&data_bytes)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(data)
}

pub fn load_collection(path: &Path) -> Result<TraitCollection> {
    load_json(path)
}

pub fn save_collection(path: &Path, collection: &TraitCollection) -> Result<()> {
    save_json(path, collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn sample() -> TraitCollection {
        let mut c = TraitCollection {
            palette: Palette::from_colors(vec!["".into(), "ff0000".into()]).unwrap(),
            bgcolors: vec!["d5d7e1".into(), "e1d7d5".into()],
            ..Default::default()
        };
        c.merge_traits(
            "heads",
            vec![Trait {
                filename: "head-a".into(),
                data: "0x00000201000401".into(),
            }],
        );
        c.merge_traits(
            "bodies",
            vec![Trait {
                filename: "body-a".into(),
                data: "0x0000000000".into(),
            }],
        );
        c
    }

    #[test]
    fn category_order_survives_json() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.find("heads").unwrap() < json.find("bodies").unwrap());
        let back: TraitCollection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
        let names: Vec<&str> = back.images.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["heads", "bodies"]);
    }

    #[test]
    fn reads_reference_layout() {
        let json = r#"{
            "bgcolors": ["d5d7e1"],
            "palette": ["", "ff0000"],
            "images": {
                "glasses": [{"filename": "glasses-red", "data": "0x00000201000401"}],
                "accessories": []
            }
        }"#;
        let c: TraitCollection = serde_json::from_str(json).unwrap();
        assert_eq!(c.palette.len(), 2);
        assert_eq!(c.images.len(), 2);
        assert_eq!(
            c.find_trait("glasses", "glasses-red").unwrap().data.as_str(),
            "0x00000201000401"
        );
        assert!(c.find_trait("glasses", "nope").is_none());
        assert!(c.find_trait("heads", "glasses-red").is_none());
    }

    #[test]
    fn missing_sentinel_is_restored() {
        let c: TraitCollection = serde_json::from_str(r#"{"palette": ["00ff00"]}"#).unwrap();
        assert_eq!(c.palette.colors(), &["", "00ff00"]);
        assert!(c.images.is_empty());
    }

    #[test]
    fn duplicate_category_is_rejected() {
        let json = r#"{"palette": [""], "images": {"a": [], "a": []}}"#;
        assert!(serde_json::from_str::<TraitCollection>(json).is_err());
    }

    #[test]
    fn merge_replaces_by_filename() {
        let mut c = sample();
        c.merge_traits(
            "heads",
            vec![
                Trait {
                    filename: "head-b".into(),
                    data: "0x0000000000".into(),
                },
                Trait {
                    filename: "head-a".into(),
                    data: "0x0000000000".into(),
                },
            ],
        );
        let heads = c.images.get("heads").unwrap();
        assert_eq!(heads.len(), 2);
        assert_eq!(heads[0].filename, "head-a");
        assert_eq!(heads[0].data.as_str(), "0x0000000000");
        assert_eq!(heads[1].filename, "head-b");
    }

    #[test]
    fn save_then_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("data/traits.json");
        save_collection(&path, &sample())?;
        assert_eq!(load_collection(&path)?, sample());
        Ok(())
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_collection(&dir.path().join("none.json")).is_err());
    }
}
