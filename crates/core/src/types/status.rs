//! Status enums for orders, payments, and users.

use serde::{Deserialize, Serialize};

/// Fulfillment status of an order, set by admins.
///
/// Serialized with the exact display strings the storefront clients key on
/// ("Order Placed", "Out for delivery", ...). The progression is conventional
/// only; no transition graph is enforced and an admin may set any value at
/// any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Order Placed")]
    OrderPlaced,
    #[serde(rename = "Packing")]
    Packing,
    #[serde(rename = "Shipped")]
    Shipped,
    #[serde(rename = "Out for delivery")]
    OutForDelivery,
    #[serde(rename = "Delivered")]
    Delivered,
}

impl OrderStatus {
    /// The wire/display string for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OrderPlaced => "Order Placed",
            Self::Packing => "Packing",
            Self::Shipped => "Shipped",
            Self::OutForDelivery => "Out for delivery",
            Self::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Order Placed" => Ok(Self::OrderPlaced),
            "Packing" => Ok(Self::Packing),
            "Shipped" => Ok(Self::Shipped),
            "Out for delivery" => Ok(Self::OutForDelivery),
            "Delivered" => Ok(Self::Delivered),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

/// How an order is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Online payment through the Razorpay gateway.
    Razorpay,
    /// Cash on delivery.
    Cod,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Razorpay => write!(f, "razorpay"),
            Self::Cod => write!(f, "cod"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "razorpay" => Ok(Self::Razorpay),
            "cod" => Ok(Self::Cod),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Role attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular storefront customer.
    #[default]
    Customer,
    /// Store administrator with access to catalog and order management.
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_strings() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::OutForDelivery).expect("serialize"),
            r#""Out for delivery""#
        );
        assert_eq!(
            serde_json::from_str::<OrderStatus>(r#""Order Placed""#).expect("deserialize"),
            OrderStatus::OrderPlaced
        );
    }

    #[test]
    fn test_order_status_from_str_rejects_unknown() {
        assert!("Cancelled".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_payment_round_trips() {
        for status in ["pending", "paid", "failed"] {
            let parsed: PaymentStatus = status.parse().expect("valid status");
            assert_eq!(parsed.to_string(), status);
        }
        for method in ["razorpay", "cod"] {
            let parsed: PaymentMethod = method.parse().expect("valid method");
            assert_eq!(parsed.to_string(), method);
        }
    }
}
