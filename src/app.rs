//! Mode dispatch: text, image, text-then-image, and the interactive tutor chat.

use crate::ai::{
    CompletionService, ImageGenerationService, TogetherChatClient, TogetherImageClient,
};
use crate::image::{ImageProcessor, ImageService};
use crate::models::{ChatHistory, Config, ImageSize, LearnerProfile};
use crate::prompts::PromptSet;
use crate::text::{wrap, WRAP_WIDTH};
use crate::Result;
use image::DynamicImage;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info};

const SEPARATOR_WIDTH: usize = 100;
const CHAT_IMAGE_FILE: &str = "chat_latest.png";

/// Preset run configuration selected by `--option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Completion,
    Image,
    TextAndImage,
    Chat,
}

impl Mode {
    pub fn from_option(option: i64) -> Option<Self> {
        match option {
            1 => Some(Mode::Completion),
            2 => Some(Mode::Image),
            3 => Some(Mode::TextAndImage),
            4 => Some(Mode::Chat),
            _ => None,
        }
    }

    pub fn option(self) -> u8 {
        match self {
            Mode::Completion => 1,
            Mode::Image => 2,
            Mode::TextAndImage => 3,
            Mode::Chat => 4,
        }
    }
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub chat: Box<dyn CompletionService>,
    pub image_gen: Box<dyn ImageGenerationService>,
    pub image: Box<dyn ImageService>,
}

/// Templates, learner profile and output locations.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub prompts: PromptSet,
    pub learner: LearnerProfile,
    pub image_size: ImageSize,
    pub results_dir: PathBuf,
}

impl AppSettings {
    pub fn new(results_dir: &Path) -> Self {
        Self {
            prompts: PromptSet::default(),
            learner: LearnerProfile::default(),
            image_size: ImageSize::default(),
            results_dir: results_dir.to_path_buf(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self::new(Path::new("results"))
    }
}

/// Couples the completion and image clients behind the four modes.
pub struct App {
    chat: Box<dyn CompletionService>,
    image_gen: Box<dyn ImageGenerationService>,
    image: Box<dyn ImageService>,
    settings: AppSettings,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices, settings: AppSettings) -> Self {
        Self {
            chat: services.chat,
            image_gen: services.image_gen,
            image: services.image,
            settings,
        }
    }

    /// Construct Together-backed clients from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        // Reuse one HTTP connection pool across both clients.
        let http_client = builder.build()?;

        info!("Chat model: {}", config.chat_model);
        info!(
            "Image model: {} ({} steps)",
            config.image_model, config.image_steps
        );

        let chat = TogetherChatClient::new_with_client(
            config.api_key.clone(),
            config.chat_model.clone(),
            config.base_url.clone(),
            http_client.clone(),
        );
        let image_gen = TogetherImageClient::new_with_client(
            config.api_key.clone(),
            config.image_model.clone(),
            config.base_url.clone(),
            http_client,
        )
        .with_steps(config.image_steps);

        let prompts = match &config.prompts_dir {
            Some(dir) => {
                info!("Loading prompt templates from {}", dir.display());
                PromptSet::from_dir(dir)?
            }
            None => PromptSet::default(),
        };

        Ok(Self::with_services(
            AppServices {
                chat: Box::new(chat),
                image_gen: Box::new(image_gen),
                image: Box::new(ImageProcessor::new(&config.scratch_image)),
            },
            AppSettings {
                prompts,
                learner: config.learner.clone(),
                image_size: config.image_size,
                results_dir: config.results_dir.clone(),
            },
        ))
    }

    /// Where a named result image is written.
    pub fn result_path(&self, file_name: &str) -> PathBuf {
        self.settings.results_dir.join(file_name)
    }

    /// One completion; optionally reflowed to the fixed column width.
    pub async fn prompt_llm(&self, prompt: &str, with_linebreak: bool) -> Result<String> {
        let output = self.chat.complete(prompt).await?;
        info!("Received completion ({} chars)", output.len());

        if with_linebreak {
            Ok(wrap(&output, WRAP_WIDTH))
        } else {
            Ok(output)
        }
    }

    /// One generated image, resized to `size`.
    pub async fn gen_image(&self, prompt: &str, size: ImageSize) -> Result<DynamicImage> {
        let image_data = self.image_gen.generate_image(prompt).await?;
        info!("Generated image ({} bytes)", image_data.len());
        self.image.process_image(&image_data, size).await
    }

    /// Handle one chat turn.
    ///
    /// The history only grows once both the reply and its illustration have
    /// been produced; on failure it is left untouched.
    pub async fn respond(
        &self,
        history: &mut ChatHistory,
        user_message: &str,
    ) -> Result<DynamicImage> {
        let prompts = &self.settings.prompts;

        let tutor_prompt = prompts.tutor_prompt(&self.settings.learner, user_message);
        let response = self.prompt_llm(&tutor_prompt, false).await?;

        let image_prompt = prompts.chat_image_prompt(&response);
        let image = self.gen_image(&image_prompt, self.settings.image_size).await?;

        history.push(user_message.to_string(), response);
        info!("Chat turn {} complete", history.len());
        Ok(image)
    }

    /// Run one mode to completion, writing user-facing output to `out`.
    ///
    /// `input` is only read by [`Mode::Chat`].
    pub async fn run<R, W>(&self, mode: Mode, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        info!("Running option {}", mode.option());

        match mode {
            Mode::Completion => self.run_completion(out).await,
            Mode::Image => self.run_image(out).await,
            Mode::TextAndImage => self.run_text_and_image(out).await,
            Mode::Chat => self.run_chat(input, out).await.map(|_| ()),
        }
    }

    async fn run_completion<W: Write>(&self, out: &mut W) -> Result<()> {
        let response = self
            .prompt_llm(&self.settings.prompts.completion, false)
            .await?;
        write_response(out, &response)
    }

    async fn run_image<W: Write>(&self, out: &mut W) -> Result<()> {
        let prompt = &self.settings.prompts.image;
        self.generate_and_save(out, prompt, "image_option_2.png")
            .await
    }

    async fn run_text_and_image<W: Write>(&self, out: &mut W) -> Result<()> {
        let prompts = &self.settings.prompts;

        let response = self.prompt_llm(&prompts.blog_text, true).await?;
        write_response(out, &response)?;

        let image_prompt = prompts.blog_image_prompt();
        self.generate_and_save(out, &image_prompt, "image_option_3.png")
            .await
    }

    async fn generate_and_save<W: Write>(
        &self,
        out: &mut W,
        prompt: &str,
        file_name: &str,
    ) -> Result<()> {
        writeln!(out, "\nCreating Image for your prompt: {} ", prompt)?;

        let image = self.gen_image(prompt, self.settings.image_size).await?;
        let path = self.result_path(file_name);
        self.image.save_image(&image, &path).await?;

        writeln!(out, "\nImage saved to {}\n", path.display())?;
        Ok(())
    }

    /// Interactive tutor session over line-based input.
    ///
    /// Blank lines are skipped; `exit`, `quit` or end of input stop the
    /// session. A failed turn is reported and the session continues.
    pub async fn run_chat<R, W>(&self, input: R, out: &mut W) -> Result<ChatHistory>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(
            out,
            "Language practice chat. Type a message, or 'exit' to quit."
        )?;

        let mut history = ChatHistory::new();
        let mut lines = input.lines();

        loop {
            write!(out, "> ")?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let message = line.trim();
            if message.is_empty() {
                continue;
            }
            if matches!(message, "exit" | "quit") {
                break;
            }

            match self.chat_turn(&mut history, message).await {
                Ok(path) => {
                    let reply = history
                        .last()
                        .map(|turn| turn.assistant_text.as_str())
                        .unwrap_or_default();
                    writeln!(out, "\nAssistant: {}\n", reply)?;
                    writeln!(out, "Image saved to {}\n", path.display())?;
                }
                Err(e) => {
                    error!("Chat turn failed: {}", e);
                    writeln!(out, "\nError: {}\n", e)?;
                }
            }
        }

        info!("Chat session ended after {} turns", history.len());
        Ok(history)
    }

    async fn chat_turn(&self, history: &mut ChatHistory, message: &str) -> Result<PathBuf> {
        let image = self.respond(history, message).await?;
        let path = self.result_path(CHAT_IMAGE_FILE);
        self.image.save_image(&image, &path).await?;
        Ok(path)
    }
}

fn write_response<W: Write>(out: &mut W, response: &str) -> Result<()> {
    writeln!(out, "\nResponse:\n")?;
    writeln!(out, "{}", response)?;
    writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
    Ok(())
}
