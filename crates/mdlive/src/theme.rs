#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn from_system(prefers_dark: bool) -> Self {
        if prefers_dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn editor_theme(self) -> &'static str {
        match self {
            Self::Light => "vs",
            Self::Dark => "vs-dark",
        }
    }

    pub fn stylesheet(self) -> &'static str {
        match self {
            Self::Light => "/css/github-markdown-light.css",
            Self::Dark => "/css/github-markdown-dark.css",
        }
    }

    pub fn page_label(self) -> &'static str {
        match self {
            Self::Light => "🌞 Theme",
            Self::Dark => "🌚 Theme",
        }
    }

    pub fn code_label(self) -> &'static str {
        match self {
            Self::Light => "🌞 Code",
            Self::Dark => "🌚 Code",
        }
    }
}

/// What the controls and editor should show after a theme change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeChange {
    pub page_label: &'static str,
    pub code_label: &'static str,
    pub editor_theme: &'static str,
    /// `None` when the markdown stylesheet stays as it is.
    pub stylesheet: Option<&'static str>,
}

/// Page theme and code theme, toggled independently of each other and of
/// everything else in the session.
#[derive(Debug, Clone)]
pub struct ThemeState {
    page: ThemeMode,
    code: ThemeMode,
}

impl ThemeState {
    pub fn from_system(prefers_dark: bool) -> Self {
        let mode = ThemeMode::from_system(prefers_dark);
        Self {
            page: mode,
            code: mode,
        }
    }

    pub fn page(&self) -> ThemeMode {
        self.page
    }

    pub fn code(&self) -> ThemeMode {
        self.code
    }

    pub fn current(&self) -> ThemeChange {
        ThemeChange {
            page_label: self.page.page_label(),
            code_label: self.code.code_label(),
            editor_theme: self.code.editor_theme(),
            stylesheet: Some(self.page.stylesheet()),
        }
    }

    /// Flip the page theme; the code theme follows it.
    pub fn toggle_page(&mut self) -> ThemeChange {
        self.page = self.page.flipped();
        self.code = self.page;
        self.current()
    }

    /// Flip only the editor theme.
    pub fn toggle_code(&mut self) -> ThemeChange {
        self.code = self.code.flipped();
        ThemeChange {
            stylesheet: None,
            ..self.current()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_follows_system() {
        let dark = ThemeState::from_system(true).current();
        assert_eq!(dark.page_label, "🌚 Theme");
        assert_eq!(dark.code_label, "🌚 Code");
        assert_eq!(dark.editor_theme, "vs-dark");

        let light = ThemeState::from_system(false).current();
        assert_eq!(light.page_label, "🌞 Theme");
        assert_eq!(light.editor_theme, "vs");
    }

    #[test]
    fn test_page_toggle_drags_code_theme_along() {
        let mut theme = ThemeState::from_system(false);
        theme.toggle_code();
        assert_eq!(theme.code(), ThemeMode::Dark);

        let change = theme.toggle_page();
        assert_eq!(theme.page(), ThemeMode::Dark);
        assert_eq!(theme.code(), ThemeMode::Dark);
        assert_eq!(change.stylesheet, Some("/css/github-markdown-dark.css"));
        assert_eq!(change.code_label, "🌚 Code");
    }

    #[test]
    fn test_code_toggle_leaves_page_alone() {
        let mut theme = ThemeState::from_system(true);
        let change = theme.toggle_code();
        assert_eq!(theme.page(), ThemeMode::Dark);
        assert_eq!(change.editor_theme, "vs");
        assert_eq!(change.code_label, "🌞 Code");
        assert_eq!(change.page_label, "🌚 Theme");
        assert_eq!(change.stylesheet, None);
    }
}
