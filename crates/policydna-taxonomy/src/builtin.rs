//! Built-in standard taxonomy.
//!
//! An explicit factory (no process-wide singleton): callers construct the
//! registry once at startup and hand shared references to the mapper. The
//! seed set follows the ISO/NAIC commercial-lines breakdown; node synonyms
//! carry the vocabulary the keyword mapping rule matches against.

use policydna_core::score::UNCLASSIFIED_CODE;

use crate::error::TaxonomyError;
use crate::node::{TaxonomyLevel, TaxonomyNode};
use crate::registry::TaxonomyRegistry;

use TaxonomyLevel::{
    CoverageAttribute, CoverageCategory, CoverageDetail, CoverageType, LineOfBusiness,
};

/// Build the standard insurance taxonomy.
pub fn builtin_registry() -> Result<TaxonomyRegistry, TaxonomyError> {
    let mut reg = TaxonomyRegistry::new();

    seed_lines(&mut reg)?;
    seed_property(&mut reg)?;
    seed_liability(&mut reg)?;
    seed_cyber(&mut reg)?;
    seed_auto(&mut reg)?;
    seed_professional(&mut reg)?;
    seed_attribute_branches(&mut reg)?;

    // Sentinel for elements no rule can classify. Kept in the registry so
    // distributions and tree views have a real node to hang them on.
    reg.add_node(TaxonomyNode::new(
        UNCLASSIFIED_CODE,
        "Unclassified",
        LineOfBusiness,
        "Elements that did not clear the minimum mapping confidence",
        "Custom",
        None,
    ))?;

    Ok(reg)
}

fn seed_lines(reg: &mut TaxonomyRegistry) -> Result<(), TaxonomyError> {
    reg.add_node(
        TaxonomyNode::new(
            "PROP",
            "Property Insurance",
            LineOfBusiness,
            "Insurance coverage for physical assets and structures",
            "ISO",
            None,
        )
        .with_synonyms(&["property", "physical damage", "first party"]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "LIAB",
            "Liability Insurance",
            LineOfBusiness,
            "Insurance coverage for legal liabilities",
            "ISO",
            None,
        )
        .with_synonyms(&["liability", "third party", "legally obligated"]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "CYBER",
            "Cyber Insurance",
            LineOfBusiness,
            "Insurance coverage for cyber risks and data breaches",
            "NAIC",
            None,
        )
        .with_synonyms(&["cyber", "data breach", "network security"]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "AUTO",
            "Auto Insurance",
            LineOfBusiness,
            "Insurance coverage for vehicles",
            "ISO",
            None,
        )
        .with_synonyms(&["auto", "automobile", "vehicle"]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "WC",
            "Workers Compensation",
            LineOfBusiness,
            "Coverage for employee injuries or illness during employment",
            "NAIC",
            None,
        )
        .with_synonyms(&["workers compensation", "occupational injury", "employee injury"]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "PROF",
            "Professional Liability",
            LineOfBusiness,
            "Liability coverage for professional services",
            "ISO",
            None,
        )
        .with_synonyms(&["professional liability", "professional services"]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "DO",
            "Directors and Officers Liability",
            LineOfBusiness,
            "Liability coverage for company directors and officers",
            "ISO",
            None,
        )
        .with_synonyms(&["directors and officers", "wrongful act", "management liability"]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "EPL",
            "Employment Practices Liability",
            LineOfBusiness,
            "Coverage for employment-related claims",
            "ISO",
            None,
        )
        .with_synonyms(&["employment practices", "wrongful termination", "discrimination"]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "MARINE",
            "Marine Insurance",
            LineOfBusiness,
            "Coverage for ocean and inland marine risks",
            "ISO",
            None,
        )
        .with_synonyms(&["marine", "cargo", "inland marine"]),
    )?;
    Ok(())
}

fn seed_property(reg: &mut TaxonomyRegistry) -> Result<(), TaxonomyError> {
    reg.add_node(
        TaxonomyNode::new(
            "PROP.BLDG",
            "Building Coverage",
            CoverageCategory,
            "Coverage for building structures",
            "ISO",
            Some("PROP"),
        )
        .with_synonyms(&[
            "building",
            "structure",
            "real property",
            "improvements",
            "fixtures",
            "premises",
        ])
        .with_examples(&[
            "We will pay for direct physical loss of or damage to Covered Property",
        ]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "PROP.BPP",
            "Business Personal Property",
            CoverageCategory,
            "Coverage for business contents and equipment",
            "ISO",
            Some("PROP"),
        )
        .with_synonyms(&[
            "personal property",
            "business personal property",
            "contents",
            "equipment",
            "inventory",
            "furniture",
        ]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "PROP.BI",
            "Business Interruption",
            CoverageCategory,
            "Coverage for lost income due to property damage",
            "ISO",
            Some("PROP"),
        )
        .with_synonyms(&[
            "business interruption",
            "time element",
            "business income",
            "extra expense",
            "continuing expenses",
            "suspended operations",
        ]),
    )?;

    reg.add_node(TaxonomyNode::new(
        "PROP.BLDG.MAIN",
        "Main Building Structure",
        CoverageType,
        "Primary building structure coverage",
        "ISO",
        Some("PROP.BLDG"),
    ))?;
    reg.add_node(TaxonomyNode::new(
        "PROP.BLDG.APPURT",
        "Appurtenant Structures",
        CoverageType,
        "Structures attached to the main building",
        "ISO",
        Some("PROP.BLDG"),
    ))?;

    reg.add_node(
        TaxonomyNode::new(
            "PROP.BLDG.DEBRISREM",
            "Debris Removal",
            CoverageDetail,
            "Coverage for costs to remove debris after a covered loss",
            "ISO",
            Some("PROP.BLDG"),
        )
        .with_synonyms(&["debris removal", "remove debris"]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "PROP.BLDG.ORDLAW",
            "Ordinance or Law",
            CoverageDetail,
            "Coverage for increased costs due to building code compliance",
            "ISO",
            Some("PROP.BLDG"),
        )
        .with_synonyms(&["ordinance or law", "building code", "code compliance"]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "PROP.BLDG.POLLCLEAN",
            "Pollutant Cleanup",
            CoverageDetail,
            "Coverage for costs to clean up pollutants from land or water",
            "ISO",
            Some("PROP.BLDG"),
        )
        .with_synonyms(&["pollutant cleanup", "clean up pollutants"]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "PROP.BPP.STOCK",
            "Stock",
            CoverageDetail,
            "Coverage for merchandise held for sale",
            "ISO",
            Some("PROP.BPP"),
        )
        .with_synonyms(&["stock", "merchandise", "held for sale"]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "PROP.BPP.FFE",
            "Furniture, Fixtures & Equipment",
            CoverageDetail,
            "Coverage for business furniture, fixtures, and equipment",
            "ISO",
            Some("PROP.BPP"),
        )
        .with_synonyms(&["furniture", "fixtures", "equipment"]),
    )?;
    Ok(())
}

fn seed_liability(reg: &mut TaxonomyRegistry) -> Result<(), TaxonomyError> {
    reg.add_node(
        TaxonomyNode::new(
            "LIAB.GL",
            "General Liability",
            CoverageCategory,
            "Liability for bodily injury and property damage",
            "ISO",
            Some("LIAB"),
        )
        .with_synonyms(&[
            "general liability",
            "premises liability",
            "operations liability",
            "bodily injury",
            "property damage",
            "personal injury",
        ])
        .with_examples(&[
            "We will pay those sums that the insured becomes legally obligated to pay as damages",
        ]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "LIAB.PROD",
            "Products Liability",
            CoverageCategory,
            "Liability for product-related injuries or damages",
            "ISO",
            Some("LIAB"),
        )
        .with_synonyms(&["products liability", "products completed operations", "your product"]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "LIAB.GL.PREMOPS",
            "Premises and Operations",
            CoverageType,
            "Liability arising out of owned premises or ongoing operations",
            "ISO",
            Some("LIAB.GL"),
        )
        .with_synonyms(&["premises", "ongoing operations"]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "LIAB.GL.MEDPAY",
            "Medical Payments",
            CoverageType,
            "No-fault medical expense payments",
            "ISO",
            Some("LIAB.GL"),
        )
        .with_synonyms(&["medical payments", "medical expenses"]),
    )?;
    Ok(())
}

fn seed_cyber(reg: &mut TaxonomyRegistry) -> Result<(), TaxonomyError> {
    reg.add_node(
        TaxonomyNode::new(
            "CYBER.BREACH",
            "Data Breach Coverage",
            CoverageCategory,
            "Coverage for data breach response costs",
            "NAIC",
            Some("CYBER"),
        )
        .with_synonyms(&[
            "data breach",
            "privacy breach",
            "notification",
            "credit monitoring",
            "forensic investigation",
            "personal information",
            "security breach",
        ]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "CYBER.LIAB",
            "Cyber Liability Coverage",
            CoverageCategory,
            "Liability coverage for data breaches and cyber incidents",
            "NAIC",
            Some("CYBER"),
        )
        .with_synonyms(&[
            "network security",
            "privacy liability",
            "cyber liability",
            "media liability",
        ]),
    )?;
    Ok(())
}

fn seed_auto(reg: &mut TaxonomyRegistry) -> Result<(), TaxonomyError> {
    reg.add_node(
        TaxonomyNode::new(
            "AUTO.LIAB",
            "Auto Liability",
            CoverageCategory,
            "Liability arising from vehicle ownership or use",
            "ISO",
            Some("AUTO"),
        )
        .with_synonyms(&["auto liability", "automobile liability", "vehicle liability"]),
    )?;
    reg.add_node(
        TaxonomyNode::new(
            "AUTO.PHYS",
            "Auto Physical Damage",
            CoverageCategory,
            "Damage to covered vehicles",
            "ISO",
            Some("AUTO"),
        )
        .with_synonyms(&["physical damage", "comprehensive", "collision", "vehicle damage"]),
    )?;
    Ok(())
}

fn seed_professional(reg: &mut TaxonomyRegistry) -> Result<(), TaxonomyError> {
    reg.add_node(
        TaxonomyNode::new(
            "PROF.EO",
            "Errors and Omissions",
            CoverageCategory,
            "Liability for negligent acts, errors, or omissions in professional services",
            "ISO",
            Some("PROF"),
        )
        .with_synonyms(&[
            "errors and omissions",
            "negligent act",
            "negligent error",
            "professional duty",
        ]),
    )?;
    Ok(())
}

fn seed_attribute_branches(reg: &mut TaxonomyRegistry) -> Result<(), TaxonomyError> {
    // Condition/territory style provisions attach to per-line attribute
    // branches rather than coverage categories.
    for (code, parent, name) in [
        ("PROP.ATTR", "PROP", "Property Policy Attributes"),
        ("LIAB.ATTR", "LIAB", "Liability Policy Attributes"),
        ("CYBER.ATTR", "CYBER", "Cyber Policy Attributes"),
        ("AUTO.ATTR", "AUTO", "Auto Policy Attributes"),
        ("WC.ATTR", "WC", "Workers Compensation Policy Attributes"),
        ("PROF.ATTR", "PROF", "Professional Liability Policy Attributes"),
    ] {
        reg.add_node(
            TaxonomyNode::new(
                code,
                name,
                CoverageCategory,
                "Conditions, territory, and other policy-level attributes",
                "Custom",
                Some(parent),
            )
            .with_synonyms(&["condition", "territory", "duties", "notice"]),
        )?;
    }

    reg.add_node(
        TaxonomyNode::new(
            "PROP.ATTR.VALUATION",
            "Valuation Method",
            CoverageAttribute,
            "Replacement cost vs actual cash value valuation",
            "ISO",
            Some("PROP.ATTR"),
        )
        .with_synonyms(&["replacement cost", "actual cash value", "valuation"]),
    )?;
    Ok(())
}
