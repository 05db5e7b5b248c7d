//! Built-in standard clauses.
//!
//! Canonical wordings drawn from widely used ISO commercial forms. Explicit
//! factory, same shape as the taxonomy seed: build once, share references.

use crate::clause::{ClauseType, StandardClause};
use crate::error::LibraryError;
use crate::library::ClauseLibrary;

/// Build the standard clause library.
pub fn builtin_library() -> Result<ClauseLibrary, LibraryError> {
    let mut lib = ClauseLibrary::new();

    lib.add_clause(
        StandardClause::new(
            "STD-PROP-BLDG-001",
            "Building Coverage Grant",
            ClauseType::CoverageGrant,
            "PROP.BLDG",
            "We will pay for direct physical loss of or damage to Covered Property at the \
             premises described in the Declarations caused by or resulting from any Covered \
             Cause of Loss.",
            "ISO",
        )
        .with_version("CP 00 10")
        .with_tags(&["property", "building", "grant"]),
    )?;

    lib.add_clause(
        StandardClause::new(
            "STD-PROP-BLDG-002",
            "Debris Removal",
            ClauseType::CoverageExtension,
            "PROP.BLDG.DEBRISREM",
            "We will pay your expense to remove debris of Covered Property caused by or \
             resulting from a Covered Cause of Loss that occurs during the policy period.",
            "ISO",
        )
        .with_version("CP 00 10")
        .with_tags(&["property", "extension"]),
    )?;

    lib.add_clause(
        StandardClause::new(
            "STD-PROP-EXCL-001",
            "Water Backup Exclusion",
            ClauseType::Exclusion,
            "PROP.BLDG",
            "We will not pay for loss or damage caused by or resulting from water that backs \
             up or overflows from a sewer, drain or sump.",
            "ISO",
        )
        .with_version("CP 10 30")
        .with_tags(&["property", "water", "exclusion"]),
    )?;

    lib.add_clause(
        StandardClause::new(
            "STD-LIAB-GL-001",
            "Commercial General Liability Coverage Grant",
            ClauseType::CoverageGrant,
            "LIAB.GL",
            "We will pay those sums that the insured becomes legally obligated to pay as \
             damages because of bodily injury or property damage to which this insurance \
             applies.",
            "ISO",
        )
        .with_version("CG 00 01")
        .with_tags(&["liability", "grant"]),
    )?;

    lib.add_clause(
        StandardClause::new(
            "STD-CYBER-BREACH-001",
            "Data Breach Response Coverage",
            ClauseType::CoverageGrant,
            "CYBER.BREACH",
            "We will pay for reasonable and necessary expenses incurred by the insured for \
             notification, credit monitoring, and forensic investigation services following a \
             data breach.",
            "Proprietary",
        )
        .with_tags(&["cyber", "breach", "grant"]),
    )?;

    Ok(lib)
}
