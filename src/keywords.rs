//! # Keyword Catalog Module
//!
//! ## Purpose
//! Fixed, ordered set of known crime-category terms used by the normalizer to
//! extract explicit lexical signal from incident narratives.
//!
//! Pure data: construction and containment lookup only. Entries are lower-cased,
//! deduplicated, and held in sorted order so that every scan over the catalog
//! is reproducible.

use std::collections::BTreeSet;

/// Crime-category terms recognized in incident narratives
const CRIME_CATEGORY_TERMS: &[&str] = &[
    "abducting",
    "abduction",
    "abetment",
    "abetment to suicide",
    "abetting",
    "abetting mutiny",
    "abuse",
    "acid attack",
    "adminstration",
    "adulteration",
    "aggravated assault",
    "arson",
    "arsonist",
    "assault",
    "attempt to murder",
    "attempted murder",
    "battery",
    "bigamy",
    "blackmail",
    "bomb",
    "bombing",
    "breach of contract",
    "bribery",
    "bribing",
    "burglary",
    "causing miscarriage",
    "cheating",
    "child abuse",
    "child pornography",
    "concealment",
    "confinement",
    "conspiracy",
    "corruption",
    "counterfeit",
    "counterfeiting",
    "criminal breach of trust",
    "criminal intimidation",
    "criminal trespass",
    "cruelty",
    "culpable homicide",
    "cyber fraud",
    "cybercrime",
    "cyberstalking",
    "dacoity",
    "damage",
    "data breach",
    "death by negligence",
    "defamation",
    "defiling",
    "defiling place worship",
    "desertion",
    "disappearance of evidence",
    "dishonestly",
    "domestic violence",
    "dowry",
    "dowry death",
    "drug trafficking",
    "drunk driving",
    "embezzlement",
    "eve teasing",
    "exciting",
    "extorting",
    "extortion",
    "fabricating false evidence",
    "false charge",
    "false claim",
    "false evidence",
    "false personation",
    "false statement",
    "forgery",
    "fornication",
    "fraud",
    "gambling",
    "grievous hurt",
    "harassment",
    "hijacking",
    "hit and run",
    "homicide",
    "hostage",
    "housebreaking",
    "human trafficking",
    "hurt",
    "identity fraud",
    "identity theft",
    "illegal weapon",
    "impersonation",
    "imputation",
    "indecent",
    "intimidation",
    "kidnap for ransom",
    "kidnapping",
    "larceny",
    "liquor",
    "manslaughter",
    "mischief",
    "molestation",
    "money",
    "money laundering",
    "murder",
    "mutilating",
    "mutilation",
    "mutiny",
    "narcotics",
    "narcotics possession",
    "obscene",
    "obstructing public servant",
    "obstruction",
    "organized crime",
    "perjury",
    "phishing",
    "piratical",
    "poisoning",
    "prostitution",
    "public nuisance",
    "rape",
    "rash driving",
    "receiving",
    "receiving stolen property",
    "restraint",
    "rioting",
    "ritualism",
    "robbery",
    "sedition",
    "seducing",
    "sexual assault",
    "sexual harassment",
    "shoplifting",
    "smuggling",
    "snatching",
    "stalking",
    "stole",
    "tampering with evidence",
    "terrorism",
    "theft",
    "threats",
    "torture",
    "trafficking",
    "trespass",
    "unauthorized access",
    "unlawful assembly",
    "unnatural",
    "uttering",
    "vandalism",
    "vehicle theft",
    "violence",
    "voyeurism",
    "weapon",
    "weapons",
    "wildlife crimes",
    "wrongful",
    "wrongful confinement",
    "wrongful restraint",
];

/// Immutable catalog of crime-category terms
#[derive(Debug, Clone)]
pub struct KeywordCatalog {
    entries: Vec<String>,
}

impl KeywordCatalog {
    /// Build a catalog from an arbitrary term list. Entries are lower-cased,
    /// deduplicated, and sorted; empty entries are discarded.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries: BTreeSet<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Number of catalog entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the catalog contains the exact (lower-cased) term
    pub fn contains(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.entries.binary_search(&needle).is_ok()
    }

    /// Iterate entries in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Collect every catalog entry contained in the given lower-cased text.
    /// Matching is exact substring containment; the result inherits the
    /// catalog's sorted order.
    pub fn matches_in(&self, lowercased_text: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| lowercased_text.contains(entry.as_str()))
            .cloned()
            .collect()
    }
}

impl Default for KeywordCatalog {
    fn default() -> Self {
        Self::from_terms(CRIME_CATEGORY_TERMS.iter().copied())
    }
}
