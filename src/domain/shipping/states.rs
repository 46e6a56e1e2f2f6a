//! Destination states and rule sentinels

/// Rule state matching any destination.
pub const ALL_STATES: &str = "All States";
/// Rule state matching any destination outside the home state.
pub const OTHER_STATES: &str = "Other States";

pub const INDIAN_STATES: [&str; 36] = [
    "Andhra Pradesh", "Arunachal Pradesh", "Assam", "Bihar", "Chhattisgarh", "Goa", "Gujarat",
    "Haryana", "Himachal Pradesh", "Jharkhand", "Karnataka", "Kerala", "Madhya Pradesh",
    "Maharashtra", "Manipur", "Meghalaya", "Mizoram", "Nagaland", "Odisha", "Punjab",
    "Rajasthan", "Sikkim", "Tamil Nadu", "Telangana", "Tripura", "Uttar Pradesh",
    "Uttarakhand", "West Bengal", "Andaman and Nicobar Islands", "Chandigarh",
    "Dadra and Nagar Haveli and Daman and Diu", "Delhi", "Jammu and Kashmir", "Ladakh",
    "Lakshadweep", "Puducherry",
];

/// A state an order can ship to. Sentinels are not destinations.
pub fn is_destination_state(state: &str) -> bool {
    INDIAN_STATES.contains(&state)
}

/// A state a shipping rule may be written for.
pub fn is_rule_state(state: &str) -> bool {
    state == ALL_STATES || state == OTHER_STATES || is_destination_state(state)
}
