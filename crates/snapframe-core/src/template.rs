//! Template layer boundary: plain item records in stacking order.

use crate::error::DesignerResult;
use crate::item::{Geometry, ItemKind, SpatialItem};
use serde::{Deserialize, Serialize};

/// Persistable description of one item. Ids are not kept; a template
/// materializes fresh items every time it is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub kind: ItemKind,
    pub geometry: Geometry,
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub locked_position: bool,
    #[serde(default)]
    pub locked_aspect_ratio: bool,
    #[serde(default = "default_resizeable")]
    pub resizeable: bool,
    #[serde(default)]
    pub aspect_ratio: f64,
    #[serde(default)]
    pub style: serde_json::Value,
}

fn default_resizeable() -> bool {
    true
}

impl ItemTemplate {
    /// Capture an item, dropping its id.
    pub fn from_item(item: &SpatialItem) -> Self {
        Self {
            kind: item.kind,
            geometry: item.geometry().clone(),
            angle: item.angle(),
            locked_position: item.locked_position,
            locked_aspect_ratio: item.locked_aspect_ratio,
            resizeable: item.resizeable,
            aspect_ratio: item.aspect_ratio,
            style: item.style.clone(),
        }
    }

    /// Build a new item, validating the geometry. A locked aspect ratio
    /// refits the height to the stored width.
    pub fn to_item(&self) -> DesignerResult<SpatialItem> {
        let mut item = SpatialItem::from_geometry(self.kind, self.geometry.clone())?;
        item.set_angle(self.angle);
        item.locked_position = self.locked_position;
        item.locked_aspect_ratio = self.locked_aspect_ratio;
        item.resizeable = self.resizeable;
        item.aspect_ratio = self.aspect_ratio;
        item.style = self.style.clone();
        item.fit_aspect();
        Ok(item)
    }
}

/// Parse a JSON array of templates.
pub fn templates_from_json(json: &str) -> DesignerResult<Vec<ItemTemplate>> {
    Ok(serde_json::from_str(json)?)
}

/// Serialize templates as a pretty JSON array.
pub fn templates_to_json(templates: &[ItemTemplate]) -> DesignerResult<String> {
    Ok(serde_json::to_string_pretty(templates)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DesignerError;
    use kurbo::Rect;

    #[test]
    fn test_from_item_keeps_locks_and_style() {
        let mut item = SpatialItem::boxed(ItemKind::Image, Rect::new(10.0, 20.0, 210.0, 120.0))
            .with_locked_aspect(2.0)
            .with_angle(30.0);
        item.style = serde_json::json!({ "border": 2 });
        let template = ItemTemplate::from_item(&item);
        assert!(template.locked_aspect_ratio);
        assert!((template.angle - 30.0).abs() < f64::EPSILON);

        let rebuilt = template.to_item().unwrap();
        assert_ne!(rebuilt.id(), item.id());
        assert_eq!(rebuilt.layout_rect(), item.layout_rect());
        assert_eq!(rebuilt.style["border"], 2);
    }

    #[test]
    fn test_parse_minimal_record() {
        let json = r#"[{"kind":"Text","geometry":{"Box":{"left":0,"top":0,"width":50,"height":20}}}]"#;
        let templates = templates_from_json(json).unwrap();
        assert_eq!(templates.len(), 1);
        assert!(templates[0].resizeable);
        assert!(!templates[0].locked_position);
    }

    #[test]
    fn test_locked_aspect_record_is_refitted() {
        let json = r#"[{"kind":"Image","geometry":{"Box":{"left":0,"top":0,"width":120,"height":50}},"locked_aspect_ratio":true,"aspect_ratio":1.2}]"#;
        let item = templates_from_json(json).unwrap()[0].to_item().unwrap();
        assert_eq!(item.layout_rect(), Rect::new(0.0, 0.0, 120.0, 100.0));
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let template = ItemTemplate {
            kind: ItemKind::Shape,
            geometry: Geometry::Box {
                left: 0.0,
                top: 0.0,
                width: -5.0,
                height: 10.0,
            },
            angle: 0.0,
            locked_position: false,
            locked_aspect_ratio: false,
            resizeable: true,
            aspect_ratio: 0.0,
            style: serde_json::Value::Null,
        };
        assert!(matches!(template.to_item(), Err(DesignerError::InvalidGeometry(_))));
    }
}
