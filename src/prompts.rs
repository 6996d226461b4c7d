use crate::models::LearnerProfile;
use crate::Result;
use std::fs;
use std::path::Path;

pub const COMPLETION: &str = include_str!("../data/prompts/completion.txt");
pub const IMAGE: &str = include_str!("../data/prompts/image.txt");
pub const BLOG_TEXT: &str = include_str!("../data/prompts/blog_text.txt");
pub const BLOG_IMAGE: &str = include_str!("../data/prompts/blog_image.txt");
pub const TUTOR: &str = include_str!("../data/prompts/tutor.txt");
pub const KNOWLEDGE: &str = include_str!("../data/prompts/knowledge.txt");
pub const CHAT_IMAGE: &str = include_str!("../data/prompts/chat_image.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// The full set of templates used by the four modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    pub completion: String,
    pub image: String,
    pub blog_text: String,
    pub blog_image: String,
    pub tutor: String,
    pub knowledge: String,
    pub chat_image: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            completion: COMPLETION.trim().to_string(),
            image: IMAGE.trim().to_string(),
            blog_text: BLOG_TEXT.trim().to_string(),
            blog_image: BLOG_IMAGE.trim().to_string(),
            tutor: TUTOR.to_string(),
            knowledge: KNOWLEDGE.to_string(),
            chat_image: CHAT_IMAGE.trim().to_string(),
        }
    }
}

impl PromptSet {
    /// Built-in templates, with any `<name>.txt` found in `dir` taking precedence.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut prompts = Self::default();
        let slots: [(&str, &mut String); 7] = [
            ("completion", &mut prompts.completion),
            ("image", &mut prompts.image),
            ("blog_text", &mut prompts.blog_text),
            ("blog_image", &mut prompts.blog_image),
            ("tutor", &mut prompts.tutor),
            ("knowledge", &mut prompts.knowledge),
            ("chat_image", &mut prompts.chat_image),
        ];

        for (name, slot) in slots {
            let path = dir.join(format!("{}.txt", name));
            if path.is_file() {
                tracing::debug!("Loading prompt override {}", path.display());
                *slot = fs::read_to_string(&path)?.trim().to_string();
            }
        }

        Ok(prompts)
    }

    /// Image prompt for the text+image mode, derived from the text prompt.
    pub fn blog_image_prompt(&self) -> String {
        render(&self.blog_image, &[("text_prompt", &self.blog_text)])
    }

    /// Tutor prompt wrapping the learner profile and the raw user message.
    pub fn tutor_prompt(&self, learner: &LearnerProfile, user_message: &str) -> String {
        let knowledge = render(
            &self.knowledge,
            &[
                ("language", &learner.language),
                ("proficiency", &learner.proficiency),
                ("recent_challenges", &learner.recent_challenges),
                ("follow_up_topics", &learner.follow_up_topics),
            ],
        );
        render(
            &self.tutor,
            &[("knowledge", knowledge.trim_end()), ("message", user_message)],
        )
    }

    /// Image prompt illustrating an assistant reply.
    pub fn chat_image_prompt(&self, response: &str) -> String {
        render(&self.chat_image, &[("response", response)])
    }
}
