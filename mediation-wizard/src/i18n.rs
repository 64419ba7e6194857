// Interface language and message catalogue
// English source texts are the catalogue keys; other languages are looked up from them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Fr,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Fr];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    /// Translate an English source text. Texts missing from the catalogue are returned as is.
    pub fn tr(self, text: &'static str) -> &'static str {
        match self {
            Language::En => text,
            Language::Fr => french().get(text).copied().unwrap_or(text),
        }
    }

    /// Whether the catalogue of this language has an entry for `text`.
    pub fn has(self, text: &str) -> bool {
        match self {
            Language::En => true,
            Language::Fr => french().contains_key(text),
        }
    }

    /// "Step N: <heading>" in this language.
    pub fn step_title(self, index: usize, heading: &'static str) -> String {
        format!("{} {}: {}", self.tr("Step"), index + 1, self.tr(heading))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    /// Accepts plain codes and region-tagged locales (`fr-FR`, `en_US`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match code.as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            _ => Err(format!("unsupported language '{}' (expected en or fr)", s.trim())),
        }
    }
}

fn french() -> &'static HashMap<&'static str, &'static str> {
    static CATALOGUE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOGUE.get_or_init(|| FRENCH.iter().copied().collect())
}

const FRENCH: &[(&str, &str)] = &[
    // window and steps
    ("Submit a mediation request", "Faire une demande de médiation"),
    ("Step", "Étape"),
    ("About you", "Vous concernant"),
    ("About yourself", "À propos de vous"),
    ("Your problem", "Votre problème"),
    ("The organization", "L'organisation"),
    ("Summary", "Récapitulatif"),
    (
        "Submit a mediation request: your details",
        "Faire une demande de médiation : vos coordonnées",
    ),
    (
        "Submit a mediation request: your problem",
        "Faire une demande de médiation : votre problème",
    ),
    (
        "Submit a mediation request: the organization",
        "Faire une demande de médiation : l'organisation",
    ),
    (
        "Submit a mediation request: summary",
        "Faire une demande de médiation : récapitulatif",
    ),
    ("Fields marked * are required.", "Les champs marqués d'une * sont obligatoires."),
    (
        "Only the 1st field \"What was the issue?\" is required.",
        "Seul le 1er champ « Quel était le problème ? » est obligatoire.",
    ),
    ("All the fields are optional.", "Tous les champs sont facultatifs."),
    (
        "Check your answers, then submit the request.",
        "Vérifiez vos réponses, puis envoyez la demande.",
    ),
    // fields
    ("First name / username", "Prénom / pseudo"),
    ("Last name", "Nom"),
    ("E-mail", "E-mail"),
    ("Phone number", "Numéro de téléphone"),
    ("Assistive technologies used", "Technologies d'assistance utilisées"),
    ("Technology name", "Nom de la technologie"),
    ("Technology version", "Version de la technologie"),
    ("What was the issue?", "Quel était le problème ?"),
    ("Steps you took", "Étapes suivies"),
    ("Inaccessibility level", "Niveau d'inaccessibilité"),
    ("Is it urgent?", "Est-ce urgent ?"),
    ("Did you use a web browser?", "Avez-vous utilisé un navigateur web ?"),
    ("URL where the problem happened", "URL où le problème est survenu"),
    ("Web browser", "Navigateur web"),
    ("Web browser version", "Version du navigateur web"),
    ("Was it a mobile app?", "S'agissait-il d'une application mobile ?"),
    ("Kind of app", "Type d'application"),
    ("Name of the app", "Nom de l'application"),
    ("Software used", "Logiciel utilisé"),
    ("Did you tell the organization?", "Avez-vous prévenu l'organisation ?"),
    ("Did they reply?", "Vous a-t-elle répondu ?"),
    ("Their reply", "Sa réponse"),
    ("Anything else?", "Autre chose ?"),
    ("Attached file (path)", "Pièce jointe (chemin)"),
    ("Organization name", "Nom de l'organisation"),
    ("Mailing address", "Adresse postale"),
    ("Contact person", "Personne à contacter"),
    // answers
    ("Not specified", "Non renseigné"),
    ("Yes", "Oui"),
    ("No", "Non"),
    ("Other", "Autre"),
    ("Don't know", "Je ne sais pas"),
    (
        "Yes, very urgent: need a quick answer",
        "Oui, très urgent : besoin d'une réponse rapide",
    ),
    (
        "Moderately, I can wait, but not too long",
        "Moyennement, je peux attendre, mais pas trop longtemps",
    ),
    (
        "Not urgent at all, but would like a solution as soon as possible",
        "Pas urgent du tout, mais je souhaite une solution dès que possible",
    ),
    ("Impossible access", "Accès impossible"),
    (
        "Access possible by bypass but difficult",
        "Accès possible en contournant, mais difficile",
    ),
    (
        "Random access, sometimes it works and sometimes it does not",
        "Accès aléatoire, parfois ça marche et parfois non",
    ),
    ("Firefox", "Firefox"),
    ("Chrome", "Chrome"),
    ("Internet Explorer", "Internet Explorer"),
    ("Microsoft Edge", "Microsoft Edge"),
    ("iOS", "iOS"),
    ("Android", "Android"),
    ("Windows phone", "Windows phone"),
    ("Keyboard", "Clavier"),
    ("Screen reader with vocal synthesis", "Lecteur d'écran avec synthèse vocale"),
    ("Braille display", "Plage braille"),
    ("Zoom software", "Logiciel d'agrandissement"),
    ("Vocal command software", "Logiciel de commande vocale"),
    ("DYS Disorder software", "Logiciel pour troubles DYS"),
    ("Virtual keyboard", "Clavier virtuel"),
    ("Adapted navigation dispositive", "Dispositif de navigation adapté"),
    ("Exclusive keyboard navigation", "Navigation exclusive au clavier"),
    // validation
    ("The first name / username is required", "Le prénom / pseudo est obligatoire"),
    ("The e-mail is required", "L'e-mail est obligatoire"),
    (
        "The e-mail must be formatted like this: name@domain.extension",
        "L'e-mail doit être au format suivant : nom@domaine.extension",
    ),
    ("The phone number format is invalid", "Le format du numéro de téléphone est invalide"),
    ("You have to describe your problem", "Vous devez décrire votre problème"),
    ("The URL format is invalid", "Le format de l'URL est invalide"),
    // buttons, dialogs and notifications
    ("Previous", "Précédent"),
    ("Next", "Suivant"),
    ("Submit", "Envoyer"),
    ("Sending...", "Envoi..."),
    ("Reset", "Réinitialiser"),
    ("Modify", "Modifier"),
    ("(nothing filled in)", "(rien de renseigné)"),
    ("Sending your mediation request...", "Envoi de votre demande de médiation..."),
    ("Esc to close", "Échap pour fermer"),
    ("Reset the form?", "Réinitialiser le formulaire ?"),
    (
        "All the answers you have given will be erased.",
        "Toutes les réponses que vous avez données seront effacées.",
    ),
    ("Yes, reset", "Oui, réinitialiser"),
    ("Quit?", "Quitter ?"),
    (
        "Your answers are kept and restored the next time you start the wizard.",
        "Vos réponses sont conservées et restaurées au prochain lancement de l'assistant.",
    ),
    ("Yes, quit", "Oui, quitter"),
    (
        "Your mediation request has been successfully sent !",
        "Votre demande de médiation a bien été envoyée !",
    ),
    (
        "There was a technical error and the submission failed, please try again later",
        "Une erreur technique est survenue et l'envoi a échoué, veuillez réessayer plus tard",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn french_is_the_default_language() {
        assert_eq!(Language::default(), Language::Fr);
    }

    #[test]
    fn catalogue_keys_are_unique() {
        let keys: HashSet<_> = FRENCH.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys.len(), FRENCH.len());
    }

    #[test]
    fn translates_known_texts_and_keeps_unknown_ones() {
        assert_eq!(Language::Fr.tr("Next"), "Suivant");
        assert_eq!(Language::En.tr("Next"), "Next");
        assert_eq!(Language::Fr.tr("Untranslated text"), "Untranslated text");
        assert!(!Language::Fr.has("Untranslated text"));
    }

    #[test]
    fn step_title_is_localized() {
        assert_eq!(Language::En.step_title(0, "About yourself"), "Step 1: About yourself");
        assert_eq!(Language::Fr.step_title(3, "Summary"), "Étape 4: Récapitulatif");
    }

    #[test]
    fn parses_codes_and_locales() {
        assert_eq!("en".parse::<Language>(), Ok(Language::En));
        assert_eq!("fr-FR".parse::<Language>(), Ok(Language::Fr));
        assert_eq!(" EN_us ".parse::<Language>(), Ok(Language::En));
        assert!("de".parse::<Language>().is_err());
        assert_eq!(Language::Fr.to_string(), "fr");
    }
}
