//! Structured edit summaries.
//!
//! Edits produce a [`Summary`] describing what happened; a
//! [`SummaryFormatter`] turns it into the revision comment that is stored.

/// A structured description of an edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    module_name: String,
    action_name: Option<String>,
    language_code: Option<String>,
    comment_args: Vec<String>,
    auto_summary_args: Vec<String>,
    user_summary: Option<String>,
}

impl Summary {
    /// Starts a summary for a module.
    #[must_use]
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            ..Self::default()
        }
    }

    /// Sets the action appended to the module name.
    #[must_use]
    pub fn action(mut self, action_name: impl Into<String>) -> Self {
        self.action_name = Some(action_name.into());
        self
    }

    /// Sets the language of the summary.
    #[must_use]
    pub fn language(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = Some(language_code.into());
        self
    }

    /// Appends an argument to the auto-comment.
    #[must_use]
    pub fn comment_arg(mut self, arg: impl Into<String>) -> Self {
        self.comment_args.push(arg.into());
        self
    }

    /// Appends an argument shown after the auto-comment.
    #[must_use]
    pub fn auto_summary_arg(mut self, arg: impl Into<String>) -> Self {
        self.auto_summary_args.push(arg.into());
        self
    }

    /// Attaches free text supplied by the user. Blank text is dropped.
    #[must_use]
    pub fn user_summary(mut self, text: Option<&str>) -> Self {
        self.user_summary = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(ToString::to_string);
        self
    }

    /// `module-action`, or just `module` without an action.
    #[must_use]
    pub fn message_key(&self) -> String {
        match &self.action_name {
            Some(action) => format!("{}-{action}", self.module_name),
            None => self.module_name.clone(),
        }
    }

    /// Language of the summary, if set.
    #[must_use]
    pub fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    /// Arguments inside the auto-comment.
    #[must_use]
    pub fn comment_args(&self) -> &[String] {
        &self.comment_args
    }

    /// Arguments after the auto-comment.
    #[must_use]
    pub fn auto_summary_args(&self) -> &[String] {
        &self.auto_summary_args
    }

    /// User-supplied text, if any.
    #[must_use]
    pub fn user_summary_text(&self) -> Option<&str> {
        self.user_summary.as_deref()
    }
}

/// Renders structured summaries as stored revision comments.
pub trait SummaryFormatter: Send + Sync {
    /// Renders a summary as an edit comment.
    fn format_summary(&self, summary: &Summary) -> String;
}

/// Wiki-style auto-comments: `/* key:count|lang|args */ auto summary, user text`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoCommentFormatter;

impl SummaryFormatter for AutoCommentFormatter {
    fn format_summary(&self, summary: &Summary) -> String {
        let mut out = format!(
            "/* {}:{}|{}|{} */",
            summary.message_key(),
            summary.auto_summary_args().len(),
            summary.language_code().unwrap_or_default(),
            summary.comment_args().join("|"),
        );

        let tail: Vec<String> = [
            (!summary.auto_summary_args().is_empty()).then(|| summary.auto_summary_args().join(", ")),
            summary.user_summary_text().map(ToString::to_string),
        ]
        .into_iter()
        .flatten()
        .collect();

        if !tail.is_empty() {
            out.push(' ');
            out.push_str(&tail.join(", "));
        }
        out
    }
}
