use std::fmt;
use std::sync::{Arc, RwLock};

use crate::error::WidgetError;
use crate::host::FrameRef;
use crate::surface::SurfaceContent;

pub type WidgetId = String;

/// Presentation supplied by a [`Presentable`] widget. The host turns it into
/// a padded surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetPresentation {
    Text {
        text: String,
        tooltip: Option<String>,
        max_width: Option<u16>,
    },
    Icon {
        glyph: String,
        tooltip: Option<String>,
    },
}

impl WidgetPresentation {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            tooltip: None,
            max_width: None,
        }
    }

    pub fn icon(glyph: impl Into<String>) -> Self {
        Self::Icon {
            glyph: glyph.into(),
            tooltip: None,
        }
    }

    pub fn into_surface(self) -> SurfaceContent {
        match self {
            Self::Text {
                text,
                tooltip,
                max_width,
            } => {
                let text = match max_width {
                    Some(max) => crate::width::truncate_to_width(&text, max),
                    None => text,
                };
                SurfaceContent {
                    text,
                    tooltip,
                    padding: 1,
                    ..SurfaceContent::default()
                }
            }
            Self::Icon { glyph, tooltip } => SurfaceContent {
                text: glyph,
                tooltip,
                padding: 1,
                ..SurfaceContent::default()
            },
        }
    }
}

/// Widget that describes what to show and lets the host build the surface.
pub trait Presentable: Send {
    fn presentation(&self) -> Option<WidgetPresentation>;

    fn install(&mut self, _frame: &FrameRef) {}

    fn dispose(&mut self) {}
}

/// Widget that owns its surface content outright.
pub trait CustomSurface: Send {
    fn surface(&self) -> SurfaceContent;

    fn install(&mut self, _frame: &FrameRef) {}

    fn dispose(&mut self) {}
}

/// The rendering capability of a widget.
pub enum WidgetBody {
    Presentable(Box<dyn Presentable>),
    CustomSurface(Box<dyn CustomSurface>),
}

impl WidgetBody {
    pub fn presentable(widget: impl Presentable + 'static) -> Self {
        Self::Presentable(Box::new(widget))
    }

    pub fn custom(widget: impl CustomSurface + 'static) -> Self {
        Self::CustomSurface(Box::new(widget))
    }
}

/// Produces fresh bodies for replicas of a widget.
pub type Replicator = Arc<dyn Fn() -> Result<WidgetBody, String> + Send + Sync>;

/// Capability tags carried by a [`WidgetHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub presentable: bool,
    pub custom_surface: bool,
    pub replicable: bool,
}

/// A widget instance as held by one status-bar instance.
pub struct WidgetHandle {
    id: WidgetId,
    body: WidgetBody,
    replicator: Option<Replicator>,
}

impl WidgetHandle {
    pub fn new(id: impl Into<WidgetId>, body: WidgetBody) -> Self {
        Self {
            id: id.into(),
            body,
            replicator: None,
        }
    }

    pub fn presentable(id: impl Into<WidgetId>, widget: impl Presentable + 'static) -> Self {
        Self::new(id, WidgetBody::presentable(widget))
    }

    pub fn custom(id: impl Into<WidgetId>, widget: impl CustomSurface + 'static) -> Self {
        Self::new(id, WidgetBody::custom(widget))
    }

    /// Build a replicable widget; `make` supplies the body of this handle and
    /// of every replica created later.
    pub fn replicable<F>(id: impl Into<WidgetId>, make: F) -> Result<Self, WidgetError>
    where
        F: Fn() -> Result<WidgetBody, String> + Send + Sync + 'static,
    {
        let id = id.into();
        let body = make().map_err(|reason| WidgetError::ReplicationFailed {
            id: id.clone(),
            reason,
        })?;
        Ok(Self {
            id,
            body,
            replicator: Some(Arc::new(make)),
        })
    }

    pub fn with_replicator(mut self, replicator: Replicator) -> Self {
        self.replicator = Some(replicator);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn body(&self) -> &WidgetBody {
        &self.body
    }

    pub fn is_replicable(&self) -> bool {
        self.replicator.is_some()
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            presentable: matches!(self.body, WidgetBody::Presentable(_)),
            custom_surface: matches!(self.body, WidgetBody::CustomSurface(_)),
            replicable: self.is_replicable(),
        }
    }

    /// Produce an independent replica with the same id.
    pub fn replicate(&self) -> Result<WidgetHandle, WidgetError> {
        let replicator = self
            .replicator
            .as_ref()
            .ok_or_else(|| WidgetError::ReplicationFailed {
                id: self.id.clone(),
                reason: "widget is not replicable".to_string(),
            })?;
        let body = replicator().map_err(|reason| WidgetError::ReplicationFailed {
            id: self.id.clone(),
            reason,
        })?;
        Ok(WidgetHandle {
            id: self.id.clone(),
            body,
            replicator: Some(Arc::clone(replicator)),
        })
    }

    /// Query the widget for its current surface content.
    pub fn surface_content(&self) -> Result<SurfaceContent, WidgetError> {
        match &self.body {
            WidgetBody::Presentable(widget) => widget
                .presentation()
                .map(WidgetPresentation::into_surface)
                .ok_or_else(|| WidgetError::MissingPresentation(self.id.clone())),
            WidgetBody::CustomSurface(widget) => Ok(widget.surface()),
        }
    }

    pub(crate) fn install(&mut self, frame: &FrameRef) {
        match &mut self.body {
            WidgetBody::Presentable(widget) => widget.install(frame),
            WidgetBody::CustomSurface(widget) => widget.install(frame),
        }
    }

    pub(crate) fn dispose(&mut self) {
        match &mut self.body {
            WidgetBody::Presentable(widget) => widget.dispose(),
            WidgetBody::CustomSurface(widget) => widget.dispose(),
        }
    }
}

impl fmt::Debug for WidgetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetHandle")
            .field("id", &self.id)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

/// Plain text widget. Clones share the text, so replicas follow `set_text`.
#[derive(Debug, Clone, Default)]
pub struct TextWidget {
    text: Arc<RwLock<String>>,
    tooltip: Option<String>,
}

impl TextWidget {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Arc::new(RwLock::new(text.into())),
            tooltip: None,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn set_text(&self, text: impl Into<String>) {
        if let Ok(mut guard) = self.text.write() {
            *guard = text.into();
        }
    }

    pub fn text(&self) -> String {
        self.text.read().map(|g| g.clone()).unwrap_or_default()
    }

    /// Wrap into a replicable handle whose replicas share this widget's text.
    pub fn into_replicable(self, id: impl Into<WidgetId>) -> WidgetHandle {
        let id = id.into();
        let template = self.clone();
        let replicator: Replicator =
            Arc::new(move || Ok(WidgetBody::presentable(template.clone())));
        WidgetHandle::presentable(id, self).with_replicator(replicator)
    }
}

impl Presentable for TextWidget {
    fn presentation(&self) -> Option<WidgetPresentation> {
        Some(WidgetPresentation::Text {
            text: self.text(),
            tooltip: self.tooltip.clone(),
            max_width: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    impl Presentable for Silent {
        fn presentation(&self) -> Option<WidgetPresentation> {
            None
        }
    }

    struct Label(&'static str);

    impl CustomSurface for Label {
        fn surface(&self) -> SurfaceContent {
            SurfaceContent::label(self.0)
        }
    }

    #[test]
    fn capabilities_follow_body_and_replicator() {
        let plain = WidgetHandle::custom("Git", Label("main"));
        let caps = plain.capabilities();
        assert!(caps.custom_surface && !caps.presentable && !caps.replicable);

        let shared = TextWidget::new("Indexing").into_replicable("Progress");
        assert!(shared.capabilities().replicable);
    }

    #[test]
    fn missing_presentation_is_reported() {
        let widget = WidgetHandle::presentable("Silent", Silent);
        assert_eq!(
            widget.surface_content().unwrap_err(),
            WidgetError::MissingPresentation("Silent".into())
        );
    }

    #[test]
    fn replicas_share_identity_and_text() {
        let text = TextWidget::new("4 spaces");
        let handle = text.clone().into_replicable("Indent");
        let replica = handle.replicate().unwrap();
        assert_eq!(replica.id(), "Indent");
        assert!(replica.is_replicable());

        text.set_text("Tab");
        assert_eq!(replica.surface_content().unwrap().text, "Tab");
    }

    #[test]
    fn non_replicable_widgets_refuse_to_replicate() {
        let handle = WidgetHandle::custom("Memory", Label("512M"));
        assert!(matches!(
            handle.replicate(),
            Err(WidgetError::ReplicationFailed { .. })
        ));
    }

    #[test]
    fn failing_replicator_surfaces_error_kind() {
        let handle = WidgetHandle::replicable("Flaky", {
            let calls = std::sync::atomic::AtomicUsize::new(0);
            move || {
                if calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                    Ok(WidgetBody::presentable(TextWidget::new("ok")))
                } else {
                    Err("backend gone".to_string())
                }
            }
        })
        .unwrap();
        let err = handle.replicate().unwrap_err();
        assert_eq!(
            err,
            WidgetError::ReplicationFailed {
                id: "Flaky".into(),
                reason: "backend gone".into()
            }
        );
    }
}
