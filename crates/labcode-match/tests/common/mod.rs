#![allow(dead_code)]

use std::path::Path;

use labcode_match::{Catalog, ValidationContext};
use labcode_model::{Record, RecordInput};
use labcode_standards::{EngineConfig, TableUnitNormalizer, parse_catalog};

pub const CATALOG: &str = "\
id,class,component,property,time,system,scale,method,display_name,status,example_units
2345-7,CHEM,Glucose,MCnc,Pt,Ser/Plas,Qn,,Glucose [Mass/volume] in Serum or Plasma,ACTIVE,mg/dL
2350-7,CHEM,Glucose,MCnc,Pt,Urine,Qn,,Glucose [Mass/volume] in Urine,ACTIVE,mg/dL
21305-8,CHEM,Glucose,MRat,24H,Urine,Qn,,Glucose [Mass/time] in 24 hour Urine,ACTIVE,mg/(24.h)
2888-6,CHEM,Protein,MCnc,Pt,Urine,Qn,,Protein [Mass/volume] in Urine,ACTIVE,mg/dL
2889-4,CHEM,Protein,MRat,24H,Urine,Qn,,Protein [Mass/time] in 24 hour Urine,ACTIVE,mg/(24.h)
2093-3,CHEM,Cholesterol,MCnc,Pt,Ser/Plas,Qn,,Cholesterol [Mass/volume] in Serum or Plasma,ACTIVE,mg/dL
5799-2,UA,Leukocytes,Naric,Pt,Urine sed,Qn,Microscopy.light.HPF,Leukocytes [#/area] in Urine sediment by Microscopy high power field,ACTIVE,/[HPF]
5821-4,UA,Leukocytes,Naric,Pt,Urine sed,Qn,Microscopy.light.LPF,Leukocytes [#/area] in Urine sediment by Microscopy low power field,ACTIVE,/[LPF]
90004-5,UA,Casts,Naric,Pt,Urine sed,Qn,,Casts [#/area] in Urine sediment,ACTIVE,/[HPF]
3024-7,CHEM,Thyroxine,MCnc,Pt,Ser/Plas,Qn,,Thyroxine (T4) [Mass/volume] in Serum or Plasma,ACTIVE,ug/dL
3026-2,CHEM,Thyroxine.free,MCnc,Pt,Ser/Plas,Qn,,Thyroxine (T4) free [Mass/volume] in Serum or Plasma,ACTIVE,ng/dL
8014-3,SERO,Rubella virus Ab.IgG,ACnc,Pt,Ser,Qn,,Rubella virus IgG Ab [Units/volume] in Serum,ACTIVE,[IU]/mL
8015-0,SERO,Rubella virus Ab.IgM,ACnc,Pt,Ser,Qn,,Rubella virus IgM Ab [Units/volume] in Serum,ACTIVE,
1754-1,CHEM,Albumin,MCnc,Pt,Urine,Qn,,Albumin [Mass/volume] in Urine,ACTIVE,mg/dL
9318-7,CHEM,Albumin/Creatinine,MRto,Pt,Urine,Qn,,Albumin/Creatinine [Mass Ratio] in Urine,ACTIVE,mg/g{creat}
24467-3,CELLMARK,CD4 cells,NCnc,Pt,Bld,Qn,,CD4 cells [#/volume] in Blood,ACTIVE,/uL
8123-2,CELLMARK,CD4 cells/100 cells,NFr,Pt,Bld,Qn,,CD4 cells/100 cells in Blood,ACTIVE,%
4548-4,CHEM,Hemoglobin A1c/Hemoglobin.total,MFr,Pt,Bld,Qn,,Hemoglobin A1c/Hemoglobin.total in Blood,ACTIVE,%
17855-8,CHEM,Hemoglobin A1c,MCnc,Pt,Bld,Qn,,Hemoglobin A1c [Mass/volume] in Blood,ACTIVE,g/dL
20563-3,CHEM,Carboxyhemoglobin/Hemoglobin.total,SFr,Pt,Bld,Qn,,Carboxyhemoglobin/Hemoglobin.total in Blood,ACTIVE,%
4544-3,CHEM,Hematocrit,VFr,Pt,Bld,Qn,,Hematocrit [Volume Fraction] of Blood,ACTIVE,%
90001-1,CHEM,Potassium,SCnc,Pt,XXX,Qn,,Potassium [Moles/volume] in Unspecified specimen,ACTIVE,mmol/L
90002-9,CHEM,Potassium,MCnc,Pt,Ser/Plas,Qn,,Potassium [Mass/volume] in Serum or Plasma,ACTIVE,mg/dL
90003-7,CHEM,Potassium,MCnc,Pt,Urine,Qn,,Potassium [Mass/volume] in Urine,DEPRECATED,mg/dL
";

pub fn catalog() -> Catalog {
    Catalog::new(parse_catalog(CATALOG.as_bytes(), Path::new("fixture.csv")).unwrap())
}

pub fn context() -> ValidationContext {
    ValidationContext::new(
        catalog(),
        EngineConfig::embedded().unwrap(),
        Box::new(TableUnitNormalizer::embedded().unwrap()),
    )
    .unwrap()
}

pub fn input(code: &str, name: &str, unit: &str) -> RecordInput {
    RecordInput::new(code, name, unit)
}

pub fn process(ctx: &ValidationContext, input: &RecordInput) -> Record {
    labcode_match::Validator::new(ctx).process(input)
}
