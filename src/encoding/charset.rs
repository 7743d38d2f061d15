//! Charset hints and the codecs they map to.

use encoding_rs::Encoding;

use crate::core::EncodingError;

/// A codec the relay can actually decode and encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
    Utf8,
    Gb18030,
    Big5,
}

impl Charset {
    /// The canonical charset every resolved document ends up in.
    pub const CANONICAL: Self = Self::Utf8;

    /// Look up a charset by any WHATWG label (`gbk`, `x-gbk`, `big5-hkscs`, ...).
    ///
    /// Labels for codecs outside the supported set are rejected even when
    /// `encoding_rs` knows them.
    pub fn from_label(label: &str) -> Result<Self, EncodingError> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| EncodingError::UnknownLabel(label.to_string()))?;

        if encoding == encoding_rs::UTF_8 {
            Ok(Self::Utf8)
        } else if encoding == encoding_rs::GBK || encoding == encoding_rs::GB18030 {
            Ok(Self::Gb18030)
        } else if encoding == encoding_rs::BIG5 {
            Ok(Self::Big5)
        } else {
            Err(EncodingError::Unsupported(encoding.name().to_string()))
        }
    }

    pub fn encoding(self) -> &'static Encoding {
        match self {
            Self::Utf8 => encoding_rs::UTF_8,
            Self::Gb18030 => encoding_rs::GB18030,
            Self::Big5 => encoding_rs::BIG5,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Gb18030 => "gb18030",
            Self::Big5 => "big5",
        }
    }
}

impl std::fmt::Display for Charset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One signal's guess at the source charset of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EncodingHint {
    Utf8,
    Gb18030,
    Big5,
    #[default]
    Unknown,
}

impl EncodingHint {
    /// Classify a charset label by case-insensitive substring match.
    ///
    /// `windows-1252` is folded into GB18030.
    pub fn classify(label: &str) -> Self {
        let label = label.to_ascii_lowercase();
        if ["gbk", "gb2312", "gb18030", "windows-1252"]
            .iter()
            .any(|name| label.contains(name))
        {
            Self::Gb18030
        } else if label.contains("big5") {
            Self::Big5
        } else if label.contains("utf-8") {
            Self::Utf8
        } else {
            Self::Unknown
        }
    }

    pub const fn charset(self) -> Option<Charset> {
        match self {
            Self::Utf8 => Some(Charset::Utf8),
            Self::Gb18030 => Some(Charset::Gb18030),
            Self::Big5 => Some(Charset::Big5),
            Self::Unknown => None,
        }
    }
}
