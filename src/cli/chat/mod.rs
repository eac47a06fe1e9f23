pub mod conversation_state;
pub mod prompt;

use std::io::Write;
use std::process::ExitCode;

use color_print::cformat;
use conversation_state::{ConversationState, Role};
use crossterm::ExecutableCommand;
use crossterm::{cursor, terminal};
use eyre::Result;
use prompt::generate_prompt;
use rustyline::Editor;
use tracing::error;
use url::Url;

use crate::emailjs_client::{ContactForm, EmailJsClient};
use crate::groq_client::ReplyGenerator;

const WELCOME_TEXT: &str = "
PRINCEWILL.AI — Lead Solutions Architect on the line. Ask about a project.

Things to try
• Build a School Management System
• Automate my Real Estate leads
• How does AI Workflow work?
• I need a high-end E-commerce site

/help         Show the help dialogue
/quit         Quit the application
";

const HELP_TEXT: &str = "
PRINCEWILL.AI sales chat

/clear        Clear the conversation history
/contact      Send a project brief by email
/whatsapp     Continue the latest quote on WhatsApp
/help         Show this help dialogue
/quit         Quit the application
";

const THINKING_TEXT: &str = "SYSTEM_THINKING...";

const WHATSAPP_PHONE: &str = "2349032650856";
const WHATSAPP_PREFIX: &str = "Ref: AI Consultation\n\n";

pub struct ChatContext {
    output: Box<dyn Write>,
    input: Option<String>,
    interactive: bool,
    conversation_state: ConversationState,
    loading: bool,
    generator: Box<dyn ReplyGenerator>,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write>,
        input: Option<String>,
        interactive: bool,
        generator: Box<dyn ReplyGenerator>,
    ) -> Self {
        Self {
            output,
            input,
            interactive,
            conversation_state: ConversationState::new(),
            loading: false,
            generator,
        }
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation_state
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        if self.interactive {
            self.print_welcome()?;
        }

        // Handle non-interactive mode (single query)
        if let Some(input) = self.input.take() {
            self.handle_input(&input).await?;
            return Ok(ExitCode::SUCCESS);
        }

        // Interactive mode
        if self.interactive {
            self.run_interactive().await?;
        }

        Ok(ExitCode::SUCCESS)
    }

    fn print_welcome(&mut self) -> Result<()> {
        writeln!(self.output, "{}", WELCOME_TEXT)?;
        Ok(())
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl()?;

        loop {
            let prompt_text = generate_prompt(None);
            let readline = rl.readline(&prompt_text);

            match readline {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line.as_str());

                    if line.trim() == "/quit" {
                        break;
                    }

                    if line.trim() == "/contact" {
                        if let Err(e) = self.run_contact_form(&mut rl).await {
                            writeln!(self.output, "Error: {}", e)?;
                        }
                        continue;
                    }

                    if let Err(e) = self.handle_input(&line).await {
                        writeln!(self.output, "Error: {}", e)?;
                    }
                }
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        Ok(())
    }

    async fn handle_input(&mut self, input: &str) -> Result<()> {
        match input.trim() {
            "/help" => {
                writeln!(self.output, "{}", HELP_TEXT)?;
            }
            "/clear" => {
                self.conversation_state.clear();
                writeln!(self.output, "Conversation cleared.")?;
            }
            "/whatsapp" => {
                self.open_whatsapp()?;
            }
            _ => {
                self.submit(input).await?;
            }
        }

        Ok(())
    }

    /// One request lifecycle: append the user turn, ask the generator for a
    /// reply with the history as it stood before this turn, and append the
    /// assistant turn on success. A failed generation is logged and leaves
    /// the transcript without a reply; no error turn is shown.
    pub async fn submit(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        let history = self.conversation_state.turns().to_vec();
        self.conversation_state.add_user_message(text);
        self.print_latest_turn()?;

        self.loading = true;
        self.show_thinking()?;

        let reply = self.generator.generate(text, &history).await;

        self.clear_thinking()?;
        self.loading = false;

        match reply {
            Ok(content) => {
                self.conversation_state.add_assistant_message(&content);
                self.print_latest_turn()?;
            }
            Err(e) => {
                error!("Reply generation failed: {}", e);
            }
        }

        Ok(())
    }

    fn print_latest_turn(&mut self) -> Result<()> {
        if let Some(turn) = self.conversation_state.turns().last() {
            let line = match turn.role {
                Role::User => cformat!("<dim>you ></dim> {}", turn.content),
                Role::Assistant => cformat!("<green>princewill.ai ></green> {}", turn.content),
            };
            writeln!(self.output, "{}", line)?;
        }
        Ok(())
    }

    fn show_thinking(&mut self) -> Result<()> {
        if self.interactive {
            writeln!(self.output, "{}", cformat!("<green><dim>{}</dim></green>", THINKING_TEXT))?;
            self.output.flush()?;
        }
        Ok(())
    }

    fn clear_thinking(&mut self) -> Result<()> {
        if self.interactive {
            let mut stdout = std::io::stdout();
            stdout.execute(cursor::MoveToPreviousLine(1))?;
            stdout.execute(terminal::Clear(terminal::ClearType::CurrentLine))?;
        }
        Ok(())
    }

    fn open_whatsapp(&mut self) -> Result<()> {
        match self.whatsapp_link() {
            Some(url) => {
                writeln!(
                    self.output,
                    "{}",
                    cformat!("<green>Secure this quote on WhatsApp:</green> {}", url)
                )?;
            }
            None => {
                writeln!(self.output, "No quote to share yet. Ask about a project first.")?;
            }
        }
        Ok(())
    }

    /// Deep link into WhatsApp pre-filled with the latest quote. Only
    /// available once the conversation holds at least one assistant turn.
    fn whatsapp_link(&self) -> Option<Url> {
        let last_reply = self.conversation_state.last_assistant_message()?;

        let mut url = Url::parse(&format!("https://wa.me/{}", WHATSAPP_PHONE)).ok()?;
        url.query_pairs_mut()
            .append_pair("text", &format!("{}{}", WHATSAPP_PREFIX, last_reply));

        Some(url)
    }

    async fn run_contact_form(&mut self, rl: &mut Editor<()>) -> Result<()> {
        writeln!(
            self.output,
            "Start a project. Three quick fields and the brief lands in my inbox."
        )?;

        let from_name = rl.readline(&generate_prompt(Some("your name > ")))?;
        let reply_to = rl.readline(&generate_prompt(Some("your email > ")))?;
        let message = rl.readline(&generate_prompt(Some("project brief > ")))?;

        let form = ContactForm {
            from_name: from_name.trim().to_string(),
            reply_to: reply_to.trim().to_string(),
            message: message.trim().to_string(),
        };

        writeln!(self.output, "SENDING BRIEF...")?;

        match EmailJsClient::new().send(&form).await {
            Ok(()) => {
                writeln!(self.output, "PROJECT BRIEF SENT SUCCESSFULLY!")?;
            }
            Err(e) => {
                error!("Contact form delivery failed: {}", e);
                writeln!(self.output, "FAILED. PLEASE USE WHATSAPP (/whatsapp).")?;
            }
        }

        Ok(())
    }
}
