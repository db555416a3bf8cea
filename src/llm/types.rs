use crate::{Result, imaging};
use async_openai::types::{
    ChatCompletionRequestMessageContentPartImage, ChatCompletionRequestMessageContentPartText,
    ChatCompletionRequestUserMessageContentPart, ImageUrl,
};
use image::DynamicImage;

/// One input handed to the generative model.
#[derive(Debug, Clone)]
pub enum PromptPart {
    Text(String),
    Image(DynamicImage),
}

impl PromptPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Image(_) => None,
        }
    }

    pub fn to_openai_part(&self) -> Result<ChatCompletionRequestUserMessageContentPart> {
        match self {
            Self::Text(text) => Ok(ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText { text: text.clone() },
            )),
            Self::Image(image) => Ok(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: imaging::to_data_uri(image)?,
                        detail: None,
                    },
                },
            )),
        }
    }
}
