/// Values typed into the patient metadata form above the editor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatientRecord {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub patient_class: String,
    pub contact_number: String,
    pub age: String,
    /// `"M"`, `"F"` or empty when not chosen.
    pub sex: String,
    pub date_of_birth: String,
    pub agency: String,
}

/// Form fields in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatientField {
    LastName,
    FirstName,
    MiddleName,
    Class,
    ContactNumber,
    Age,
    Sex,
    DateOfBirth,
    Agency,
}

/// Input widget a field is edited with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
    /// `(stored value, label)` pairs.
    Choice(&'static [(&'static str, &'static str)]),
}

pub const SEX_CHOICES: &[(&str, &str)] = &[("M", "Male"), ("F", "Female")];

impl PatientField {
    pub const ALL: [PatientField; 9] = [
        PatientField::LastName,
        PatientField::FirstName,
        PatientField::MiddleName,
        PatientField::Class,
        PatientField::ContactNumber,
        PatientField::Age,
        PatientField::Sex,
        PatientField::DateOfBirth,
        PatientField::Agency,
    ];

    /// Placeholder shown in the empty input.
    pub fn label(self) -> &'static str {
        match self {
            PatientField::LastName => "Last Name",
            PatientField::FirstName => "First Name",
            PatientField::MiddleName => "Middle Name",
            PatientField::Class => "Class",
            PatientField::ContactNumber => "Contact Number",
            PatientField::Age => "Age",
            PatientField::Sex => "Sex",
            PatientField::DateOfBirth => "Date of Birth",
            PatientField::Agency => "Agency",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            PatientField::Age => FieldKind::Number,
            PatientField::Sex => FieldKind::Choice(SEX_CHOICES),
            PatientField::DateOfBirth => FieldKind::Date,
            _ => FieldKind::Text,
        }
    }
}

impl PatientRecord {
    fn slot_mut(&mut self, field: PatientField) -> &mut String {
        match field {
            PatientField::LastName => &mut self.last_name,
            PatientField::FirstName => &mut self.first_name,
            PatientField::MiddleName => &mut self.middle_name,
            PatientField::Class => &mut self.patient_class,
            PatientField::ContactNumber => &mut self.contact_number,
            PatientField::Age => &mut self.age,
            PatientField::Sex => &mut self.sex,
            PatientField::DateOfBirth => &mut self.date_of_birth,
            PatientField::Agency => &mut self.agency,
        }
    }

    pub fn set(&mut self, field: PatientField, value: &str) {
        *self.slot_mut(field) = value.to_string();
    }

    pub fn get(&self, field: PatientField) -> &str {
        match field {
            PatientField::LastName => &self.last_name,
            PatientField::FirstName => &self.first_name,
            PatientField::MiddleName => &self.middle_name,
            PatientField::Class => &self.patient_class,
            PatientField::ContactNumber => &self.contact_number,
            PatientField::Age => &self.age,
            PatientField::Sex => &self.sex,
            PatientField::DateOfBirth => &self.date_of_birth,
            PatientField::Agency => &self.agency,
        }
    }

    /// "Last, First Middle" for the content header; empty parts are skipped.
    pub fn display_name(&self) -> String {
        let given = [self.first_name.trim(), self.middle_name.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        match (self.last_name.trim(), given.as_str()) {
            ("", "") => String::new(),
            (last, "") => last.to_string(),
            ("", given) => given.to_string(),
            (last, given) => format!("{}, {}", last, given),
        }
    }
}
