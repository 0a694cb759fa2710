//! Source files shared by the unit tests.

/// Two-input AND gate routed through an internal signal.
pub const AND_GATE_SOURCE: &str = "\
-- Import IEEE defined STD_LOGIC types
library ieee;
use ieee.std_logic_1164.all;

-- Define the basic entity
entity ExampleEntity is
    port(
        A: in std_logic;
        B: in std_logic;
        C: out std_logic
    );
end ExampleEntity;


-- Define the basic architecture
architecture ExampleArchitecture of ExampleEntity is

    signal temp: std_logic;

begin

    -- Perform 'AND' of 'A' and 'B'
    temp <= A and B;

    -- connect 'temp' to 'C
    C <= temp;

end architecture ; -- ExampleArchitecture";

/// Four-way multiplexer written as a conditional signal assignment.
pub const MUX_SOURCE: &str = "\
library ieee;
use ieee.std_logic_1164.all;

entity Mux is
    port(
        A, B: in std_logic;
        C: in std_logic;
        S: in std_logic;
        T: in std_logic;
        Y: out std_logic
    );
end entity Mux;

architecture Behavior of Mux is
begin
    Y <= A when S = '1' else
         B when S = '0' else
         (A and C) when T = '1' else
         '0';
end Behavior;";

/// Wraps an architecture body in the entity used by most lowering tests.
pub fn with_body(signals: &str, body: &str) -> String {
    format!(
        "entity Top is
    port(
        A: in std_logic;
        B: in std_logic;
        C: in std_logic;
        S: in std_logic;
        Y: out std_logic;
        Z: out std_logic
    );
end Top;

architecture Rtl of Top is
{signals}
begin
{body}
end architecture;
"
    )
}
