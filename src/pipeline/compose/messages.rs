//! Fixed guidance lines, localized for English and Indonesian.

use crate::models::{Language, SymptomTag};

pub const INSUFFICIENT_INFORMATION: &str =
    "Not enough information to suggest a likely condition. \
     Please describe your symptoms in more detail, including how long you have had them.";

pub const SEEK_IMMEDIATE_CARE: &str =
    "Seek immediate medical care: go to the nearest emergency department or call emergency services.";

pub fn insufficient_information_i18n(lang: Language) -> &'static str {
    match lang {
        Language::Id => "Informasi belum cukup untuk menyarankan kondisi yang mungkin. \
                         Mohon jelaskan gejala Anda lebih rinci, termasuk sudah berapa lama.",
        Language::En => INSUFFICIENT_INFORMATION,
    }
}

pub fn seek_immediate_care_i18n(lang: Language) -> &'static str {
    match lang {
        Language::Id => "Segera cari pertolongan medis: pergi ke IGD terdekat \
                         atau hubungi layanan darurat.",
        Language::En => SEEK_IMMEDIATE_CARE,
    }
}

/// Local emergency numbers, where the language implies a locale that has them.
pub fn emergency_contacts_i18n(lang: Language) -> Option<&'static str> {
    match lang {
        Language::Id => Some("Nomor darurat: 118 (ambulans), 119 (rumah sakit terdekat)."),
        Language::En => None,
    }
}

/// "Warning signs reported: chest pain, seizure."
pub fn red_flags_line_i18n<'a>(
    lang: Language,
    flags: impl IntoIterator<Item = &'a SymptomTag>,
) -> String {
    let labels: Vec<String> = flags.into_iter().map(SymptomTag::label).collect();
    let prefix = match lang {
        Language::Id => "Tanda bahaya yang dilaporkan",
        Language::En => "Warning signs reported",
    };
    format!("{prefix}: {}.", labels.join(", "))
}
