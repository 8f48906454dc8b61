//! User-facing text in the supported languages.

use crate::domain::Language;
use crate::error::{AnalysisError, UploadFailure};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    UnitGrams,
    AnalyzingProgress,
    UploadFailed,
    AnalysisFailed,
    DataFormatError,
    AnalysisTimeout,
    ConnectionFailed,
    FileSizeError,
    FileTypeError,
    Calories,
    Protein,
    Carbs,
    Fat,
    Quality,
    Tip,
}

impl Message {
    pub fn text(self, lang: Language) -> &'static str {
        match lang {
            Language::En => self.en(),
            Language::Zh => self.zh(),
        }
    }

    fn en(self) -> &'static str {
        match self {
            Message::UnitGrams => "g",
            Message::AnalyzingProgress => "AI Analyzing...",
            Message::UploadFailed => "Image upload failed",
            Message::AnalysisFailed => "Analysis failed",
            Message::DataFormatError => "Invalid data format received, unable to display results",
            Message::AnalysisTimeout => "Analysis timeout, please check network connection and retry",
            Message::ConnectionFailed => "Failed to connect to analysis service",
            Message::FileSizeError => "File size must be less than 10MB",
            Message::FileTypeError => "Please select a valid image file (JPEG, PNG, WebP)",
            Message::Calories => "Calories",
            Message::Protein => "Protein",
            Message::Carbs => "Carbs",
            Message::Fat => "Fat",
            Message::Quality => "Meal quality",
            Message::Tip => "Tip",
        }
    }

    fn zh(self) -> &'static str {
        match self {
            Message::UnitGrams => "克",
            Message::AnalyzingProgress => "AI分析中...",
            Message::UploadFailed => "图片上传失败",
            Message::AnalysisFailed => "分析失败",
            Message::DataFormatError => "收到的数据格式不正确，无法显示分析结果",
            Message::AnalysisTimeout => "分析超时，请检查网络连接后重试",
            Message::ConnectionFailed => "连接分析服务失败",
            Message::FileSizeError => "文件大小必须小于10MB",
            Message::FileTypeError => "请选择有效的图片文件（JPEG、PNG、WebP）",
            Message::Calories => "热量",
            Message::Protein => "蛋白质",
            Message::Carbs => "碳水化合物",
            Message::Fat => "脂肪",
            Message::Quality => "餐食品质",
            Message::Tip => "建议",
        }
    }
}

/// The message shown when an analysis request fails.
pub fn failure_message(err: &AnalysisError, lang: Language) -> String {
    match err {
        AnalysisError::Upload(failure) => format!(
            "{}: {}",
            Message::AnalysisFailed.text(lang),
            upload_reason(failure, lang)
        ),
        AnalysisError::Timeout { .. } => Message::AnalysisTimeout.text(lang).to_string(),
        AnalysisError::DataFormat(_) => Message::DataFormatError.text(lang).to_string(),
    }
}

fn upload_reason(failure: &UploadFailure, lang: Language) -> String {
    match (failure, lang) {
        (UploadFailure::Timeout, Language::En) => {
            "AI analysis timed out, please try again later or check the network connection".to_string()
        }
        (UploadFailure::Timeout, Language::Zh) => "AI分析超时，请稍后再试或检查网络连接".to_string(),
        (UploadFailure::Network(_), _) => Message::ConnectionFailed.text(lang).to_string(),
        (UploadFailure::Http { status, reason }, _) => format!("HTTP {status}: {reason}"),
        (UploadFailure::Unknown(detail), _) if !detail.trim().is_empty() => detail.clone(),
        (UploadFailure::Unknown(_), _) => Message::UploadFailed.text(lang).to_string(),
    }
}
